use super::buffer_layer::{BufferLayer, BufferLayerConfig};
use super::engine::{AssetSource, AudioEngine};
use super::error::Result;
use super::layer::{LayerControl, Presenter, Scheduler};
use super::reverb_layer::{ReverbLayer, ReverbLayerConfig};
use std::rc::Rc;

/// Configuration of the three-layer scene: two loops feeding one reverb.
#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub keys: BufferLayerConfig,
    pub mixer: ReverbLayerConfig,
    pub trees: BufferLayerConfig,
}

pub struct ScenePresenters {
    pub keys: Rc<dyn Presenter>,
    pub mixer: Rc<dyn Presenter>,
    pub trees: Rc<dyn Presenter>,
}

/// The composed scene. Owns the layers and is the only place their audio is
/// wired or started.
pub struct Scene<E: AudioEngine> {
    pub keys: Rc<BufferLayer<E>>,
    pub mixer: Rc<ReverbLayer<E>>,
    pub trees: Rc<BufferLayer<E>>,
}

impl<E: AudioEngine + 'static> Scene<E> {
    /// Build the layers and wire loops -> reverb inputs -> destination.
    pub fn build(
        engine: Rc<E>,
        config: SceneConfig,
        presenters: ScenePresenters,
        scheduler: Rc<dyn Scheduler>,
    ) -> Result<Self> {
        let keys = Rc::new(BufferLayer::new(
            engine.clone(),
            config.keys,
            presenters.keys,
            scheduler.clone(),
        )?);
        let mixer = Rc::new(ReverbLayer::new(
            engine.clone(),
            config.mixer,
            presenters.mixer,
            scheduler.clone(),
        )?);
        let trees = Rc::new(BufferLayer::new(
            engine.clone(),
            config.trees,
            presenters.trees,
            scheduler,
        )?);

        keys.connect_audio(mixer.as_ref())?;
        trees.connect_audio(mixer.as_ref())?;
        mixer.connect_audio(&engine.destination())?;
        log::info!("[audio] scene wired: keys, trees -> mixer -> destination");

        Ok(Self { keys, mixer, trees })
    }

    /// Loop layers, in page order.
    pub fn loops(&self) -> [Rc<BufferLayer<E>>; 2] {
        [self.keys.clone(), self.trees.clone()]
    }

    /// Every layer as a control, in page order.
    pub fn controls(&self) -> [Rc<dyn LayerControl>; 3] {
        [
            self.keys.clone() as Rc<dyn LayerControl>,
            self.mixer.clone() as Rc<dyn LayerControl>,
            self.trees.clone() as Rc<dyn LayerControl>,
        ]
    }
}

/// Load a loop and start it once decoded. Returns whether it is playing.
///
/// Each loop is meant to run as its own task; a failure here never touches
/// the other layers.
pub async fn start_when_loaded<E: AudioEngine, A: AssetSource>(
    layer: &BufferLayer<E>,
    assets: &A,
) -> bool {
    if !layer.init_audio(assets).await {
        return false;
    }
    match layer.start_audio() {
        Ok(()) => true,
        Err(e) => {
            log::warn!("[audio] could not start {}: {}", layer.layer().id(), e);
            false
        }
    }
}
