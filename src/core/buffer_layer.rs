use super::constants::{slider_to_level, LOOP_GAIN_OFF, LOOP_GAIN_ON, LOOP_SLIDER_DEFAULT, RAMP_WINDOW};
use super::engine::{AssetSource, AudioEngine, AudioInputs};
use super::error::{LayerError, Result};
use super::layer::{Layer, LayerConfig, LayerControl, Presenter, Scheduler};
use super::ramp::RampingGainNode;
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct BufferLayerConfig {
    pub layer: LayerConfig,
    pub sample_url: String,
    pub ramp_window: Duration,
}

impl BufferLayerConfig {
    pub fn new(layer: LayerConfig, sample_url: impl Into<String>) -> Self {
        Self {
            layer,
            sample_url: sample_url.into(),
            ramp_window: RAMP_WINDOW,
        }
    }
}

/// Layer playing a looping sample that fades in and out on each click.
pub struct BufferLayer<E: AudioEngine> {
    layer: Layer,
    engine: Rc<E>,
    sample_url: String,
    source: E::Node,
    output: E::Node,
    loop_gain: Rc<RefCell<RampingGainNode<E::Gain>>>,
    loaded: Cell<bool>,
}

impl<E: AudioEngine> BufferLayer<E> {
    pub fn new(
        engine: Rc<E>,
        config: BufferLayerConfig,
        presenter: Rc<dyn Presenter>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Result<Self> {
        let layer = Layer::new(config.layer, presenter, scheduler)?;

        let gain = engine.create_gain()?;
        let output = engine.gain_node(&gain);
        let loop_gain = Rc::new(RefCell::new(
            RampingGainNode::new(gain, LOOP_GAIN_OFF, LOOP_GAIN_ON)
                .with_ramp_window(config.ramp_window),
        ));
        let source = engine.create_loop_source()?;
        engine.connect(&source, &output)?;

        let hook_gain = loop_gain.clone();
        layer.register_toggle_hook(move || hook_gain.borrow_mut().toggle());

        Ok(Self {
            layer,
            engine,
            sample_url: config.sample_url,
            source,
            output,
            loop_gain,
            loaded: Cell::new(false),
        })
    }

    /// Fetch and decode the loop. Failure is logged and leaves the layer silent.
    pub async fn init_audio<A: AssetSource>(&self, assets: &A) -> bool {
        match self.load_sample(assets).await {
            Ok(()) => {
                log::info!("[audio] {} loaded {}", self.layer.id(), self.sample_url);
                true
            }
            Err(e) => {
                log::warn!("[audio] {}: {} (running without audio)", self.layer.id(), e);
                false
            }
        }
    }

    async fn load_sample<A: AssetSource>(&self, assets: &A) -> Result<()> {
        let bytes = assets.fetch(&self.sample_url).await?;
        let buffer = self
            .engine
            .decode(bytes)
            .await
            .map_err(|e| LayerError::Decode {
                url: self.sample_url.clone(),
                reason: e.to_string(),
            })?;
        self.engine.set_loop_buffer(&self.source, buffer)?;
        self.loaded.set(true);
        Ok(())
    }

    /// Route the loop output into every input `target` declares.
    pub fn connect_audio<T: AudioInputs<E::Node> + ?Sized>(&self, target: &T) -> Result<()> {
        for input in target.inputs() {
            self.engine.connect(&self.output, &input)?;
        }
        Ok(())
    }

    pub fn start_audio(&self) -> Result<()> {
        if !self.loaded.get() {
            return Err(LayerError::NotLoaded(self.layer.id().to_string()));
        }
        self.engine.start_loop(&self.source)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    pub fn sample_url(&self) -> &str {
        &self.sample_url
    }

    pub fn output(&self) -> &E::Node {
        &self.output
    }

    pub fn source(&self) -> &E::Node {
        &self.source
    }

    pub fn loop_gain(&self) -> Ref<'_, RampingGainNode<E::Gain>> {
        self.loop_gain.borrow()
    }
}

impl<E: AudioEngine> LayerControl for BufferLayer<E> {
    fn layer(&self) -> &Layer {
        &self.layer
    }

    fn on_slide(&self, value: f32) {
        self.loop_gain
            .borrow_mut()
            .set_manual_level(slider_to_level(value));
    }

    fn slider_default(&self) -> Option<u8> {
        Some(LOOP_SLIDER_DEFAULT)
    }
}
