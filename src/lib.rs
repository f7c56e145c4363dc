#![cfg(target_arch = "wasm32")]
use crate::constants::{
    asset_url, ASSET_ROOT_ATTRIBUTE, AUDIO_CLICK_OFF, AUDIO_CLICK_ON, AUDIO_KEYS, AUDIO_TREES,
    DEFAULT_ASSET_ROOT, IMAGES_KEYS, IMAGES_MIXER, IMAGES_TREES, KEYS_LAYER_ID, MAIN_ELEMENT_ID,
    MIXER_LAYER_ID, STYLESHEET, TREES_LAYER_ID,
};
use crate::core::{
    start_when_loaded, BufferLayerConfig, Frame, LayerConfig, LayerControl, Presenter,
    ReverbLayerConfig, Scene, SceneConfig, ScenePresenters,
};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod assets;
mod audio;
mod constants;
pub mod core;
mod dom;
mod gesture;
mod timer;

fn frames(root: &str, table: &[(&str, bool)]) -> Vec<Frame> {
    table
        .iter()
        .map(|&(name, is_transition)| Frame {
            url: asset_url(root, name),
            is_transition,
        })
        .collect()
}

fn scene_config(root: &str) -> SceneConfig {
    SceneConfig {
        keys: BufferLayerConfig::new(
            LayerConfig::new(KEYS_LAYER_ID, frames(root, &IMAGES_KEYS)),
            asset_url(root, AUDIO_KEYS),
        ),
        mixer: ReverbLayerConfig::new(LayerConfig::new(
            MIXER_LAYER_ID,
            frames(root, &IMAGES_MIXER),
        )),
        trees: BufferLayerConfig::new(
            LayerConfig::new(TREES_LAYER_ID, frames(root, &IMAGES_TREES)),
            asset_url(root, AUDIO_TREES),
        ),
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("tyes-layers starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let main = document
        .get_element_by_id(MAIN_ELEMENT_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", MAIN_ELEMENT_ID))?;
    let root = main
        .get_attribute(ASSET_ROOT_ATTRIBUTE)
        .unwrap_or_else(|| DEFAULT_ASSET_ROOT.to_string());
    log::info!("[assets] root {}", root);

    dom::inject_stylesheet(&document, &asset_url(&root, STYLESHEET))?;
    let engine = Rc::new(audio::WebAudio::new()?);

    let cues = Rc::new(dom::ClickCues::create(
        &document,
        &main,
        &asset_url(&root, AUDIO_CLICK_ON),
        &asset_url(&root, AUDIO_CLICK_OFF),
    )?);

    let config = scene_config(&root);
    let image = |layer: &LayerConfig| -> anyhow::Result<web::HtmlImageElement> {
        let first = layer
            .frames
            .first()
            .map(|f| f.url.as_str())
            .unwrap_or_default();
        dom::create_layer_image(&document, &main, &layer.id, first)
    };
    let images = [
        image(&config.keys.layer)?,
        image(&config.mixer.layer)?,
        image(&config.trees.layer)?,
    ];
    let presenter = |img: &web::HtmlImageElement| {
        Rc::new(dom::DomPresenter::new(img.clone(), cues.clone())) as Rc<dyn Presenter>
    };
    let presenters = ScenePresenters {
        keys: presenter(&images[0]),
        mixer: presenter(&images[1]),
        trees: presenter(&images[2]),
    };

    let scene = Scene::build(
        engine.clone(),
        config,
        presenters,
        Rc::new(timer::TimeoutScheduler),
    )?;
    for (img, control) in images.iter().zip(scene.controls()) {
        dom::mount_layer(&document, &main, img, control)?;
    }

    // Gesture unlock and loop loading run side by side; loops start muted
    // and are heard once the context resumes.
    if let Some(body) = document.body() {
        let ctx = engine.context().clone();
        spawn_local(async move {
            if let Err(e) = gesture::unlock(&ctx, &body).await {
                log::error!("[gesture] unlock error: {:?}", e);
            }
        });
    }
    for layer in scene.loops() {
        spawn_local(async move {
            if start_when_loaded(&*layer, &assets::WebAssets).await {
                log::info!("[audio] {} loop playing", layer.layer().id());
            }
        });
    }
    Ok(())
}
