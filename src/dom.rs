use crate::constants::{slider_id, LAYER_CLASS, SLIDER_CLASS};
use crate::core::{LayerControl, Presenter};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn add_listener(target: &web::EventTarget, event: &str, mut handler: impl FnMut() + 'static) {
    let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        log::error!("[dom] {} listener error: {:?}", event, e);
    }
    closure.forget();
}

fn create<T: JsCast>(document: &web::Document, tag: &str) -> anyhow::Result<T> {
    document
        .create_element(tag)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .dyn_into::<T>()
        .map_err(|e| anyhow::anyhow!("<{}> has unexpected type: {:?}", tag, e))
}

pub fn inject_stylesheet(document: &web::Document, href: &str) -> anyhow::Result<()> {
    let head = document.head().ok_or_else(|| anyhow::anyhow!("no <head>"))?;
    let link: web::Element = document
        .create_element("link")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    _ = link.set_attribute("rel", "stylesheet");
    _ = link.set_attribute("type", "text/css");
    _ = link.set_attribute("href", href);
    head.append_child(&link)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(())
}

pub fn create_layer_image(
    document: &web::Document,
    main: &web::Element,
    id: &str,
    src: &str,
) -> anyhow::Result<web::HtmlImageElement> {
    let image: web::HtmlImageElement = create(document, "img")?;
    image.set_id(id);
    _ = image.class_list().add_1(LAYER_CLASS);
    image.set_src(src);
    main.append_child(&image)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(image)
}

/// Two short cues shared by every layer.
pub struct ClickCues {
    on: web::HtmlAudioElement,
    off: web::HtmlAudioElement,
}

impl ClickCues {
    pub fn create(
        document: &web::Document,
        main: &web::Element,
        on_src: &str,
        off_src: &str,
    ) -> anyhow::Result<Self> {
        let cue = |src: &str| -> anyhow::Result<web::HtmlAudioElement> {
            let el: web::HtmlAudioElement = create(document, "audio")?;
            el.set_src(src);
            main.append_child(&el)
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            Ok(el)
        };
        Ok(Self {
            on: cue(on_src)?,
            off: cue(off_src)?,
        })
    }

    fn play(&self, entering_on: bool) {
        let el = if entering_on { &self.on } else { &self.off };
        el.set_current_time(0.0);
        if let Err(e) = el.play() {
            log::warn!("[dom] click cue error: {:?}", e);
        }
    }
}

/// Presenter for one layer's `<img>`.
pub struct DomPresenter {
    image: web::HtmlImageElement,
    cues: Rc<ClickCues>,
}

impl DomPresenter {
    pub fn new(image: web::HtmlImageElement, cues: Rc<ClickCues>) -> Self {
        Self { image, cues }
    }
}

impl Presenter for DomPresenter {
    fn set_displayed_frame(&self, url: &str) {
        self.image.set_src(url);
    }

    fn play_feedback(&self, entering_on: bool) {
        self.cues.play(entering_on);
    }
}

/// Hook a layer up to its image clicks and, if it has one, a slider placed
/// right after the image.
pub fn mount_layer(
    document: &web::Document,
    main: &web::Element,
    image: &web::HtmlImageElement,
    control: Rc<dyn LayerControl>,
) -> anyhow::Result<()> {
    {
        let control = control.clone();
        add_listener(image, "click", move || {
            control.toggle();
        });
    }

    let Some(default) = control.slider_default() else {
        return Ok(());
    };
    let slider: web::HtmlInputElement = create(document, "input")?;
    slider.set_id(&slider_id(&image.id()));
    slider.set_type("range");
    slider.set_min("0");
    slider.set_max("100");
    _ = slider.class_list().add_1(SLIDER_CLASS);
    slider.set_value(&default.to_string());
    main.insert_before(&slider, image.next_sibling().as_ref())
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;

    let reader = slider.clone();
    add_listener(&slider, "input", move || match reader.value().parse::<f32>() {
        Ok(value) => control.on_slide(value),
        Err(_) => log::warn!("[dom] ignoring slider value {:?}", reader.value()),
    });
    Ok(())
}
