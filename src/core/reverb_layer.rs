use super::constants::{
    slider_to_level, DRY_GAIN_OFF, DRY_GAIN_ON, FLASH_DELAY, RAMP_WINDOW, REVERB_DECAY,
    REVERB_SECONDS, REVERB_SLIDER_DEFAULT, WET_GAIN_OFF, WET_GAIN_ON,
};
use super::engine::{AudioEngine, AudioInputs};
use super::error::Result;
use super::impulse::ImpulseResponse;
use super::layer::{ImageAdvance, Layer, LayerConfig, LayerControl, Presenter, Scheduler};
use super::ramp::RampingGainNode;
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ReverbLayerConfig {
    pub layer: LayerConfig,
    pub seconds: f32,
    pub decay: f32,
    /// Delay before the forced second image step.
    pub flash_delay: Duration,
    pub ramp_window: Duration,
}

impl ReverbLayerConfig {
    pub fn new(layer: LayerConfig) -> Self {
        Self {
            layer,
            seconds: REVERB_SECONDS,
            decay: REVERB_DECAY,
            flash_delay: FLASH_DELAY,
            ramp_window: RAMP_WINDOW,
        }
    }
}

/// Layer cross-fading everything routed into it between a dry path and a
/// convolution reverb.
///
/// Upstream layers connect into [`AudioInputs::inputs`]: the convolver (wet
/// path) and the dry gain. A click ramps both gains together and flashes the
/// image through one intermediate frame.
pub struct ReverbLayer<E: AudioEngine> {
    layer: Layer,
    engine: Rc<E>,
    convolver: E::Node,
    dry_node: E::Node,
    wet_node: E::Node,
    dry_gain: Rc<RefCell<RampingGainNode<E::Gain>>>,
    wet_gain: Rc<RefCell<RampingGainNode<E::Gain>>>,
    decay: f32,
    impulse_len: usize,
}

impl<E: AudioEngine> ReverbLayer<E> {
    pub fn new(
        engine: Rc<E>,
        config: ReverbLayerConfig,
        presenter: Rc<dyn Presenter>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Result<Self> {
        // Reject bad impulse parameters before anything reaches the page
        let impulse = ImpulseResponse::generate(engine.sample_rate(), config.seconds, config.decay)?;

        let layer_config = config.layer.with_image_advance(ImageAdvance::FlashThrough {
            delay: config.flash_delay,
        });
        let layer = Layer::new(layer_config, presenter, scheduler)?;

        let convolver = engine.create_convolver(&impulse)?;
        let dry = engine.create_gain()?;
        let wet = engine.create_gain()?;
        let dry_node = engine.gain_node(&dry);
        let wet_node = engine.gain_node(&wet);
        let dry_gain = Rc::new(RefCell::new(
            RampingGainNode::new(dry, DRY_GAIN_OFF, DRY_GAIN_ON).with_ramp_window(config.ramp_window),
        ));
        let wet_gain = Rc::new(RefCell::new(
            RampingGainNode::new(wet, WET_GAIN_OFF, WET_GAIN_ON).with_ramp_window(config.ramp_window),
        ));
        engine.connect(&convolver, &wet_node)?;

        let (hook_dry, hook_wet) = (dry_gain.clone(), wet_gain.clone());
        layer.register_toggle_hook(move || {
            hook_wet.borrow_mut().toggle();
            hook_dry.borrow_mut().toggle();
        });

        Ok(Self {
            layer,
            engine,
            convolver,
            dry_node,
            wet_node,
            dry_gain,
            wet_gain,
            decay: config.decay,
            impulse_len: impulse.len(),
        })
    }

    /// Send both mix paths to `node`.
    pub fn connect_audio(&self, node: &E::Node) -> Result<()> {
        self.engine.connect(&self.dry_node, node)?;
        self.engine.connect(&self.wet_node, node)
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn impulse_len(&self) -> usize {
        self.impulse_len
    }

    pub fn convolver(&self) -> &E::Node {
        &self.convolver
    }

    pub fn dry_gain(&self) -> Ref<'_, RampingGainNode<E::Gain>> {
        self.dry_gain.borrow()
    }

    pub fn wet_gain(&self) -> Ref<'_, RampingGainNode<E::Gain>> {
        self.wet_gain.borrow()
    }
}

impl<E: AudioEngine> AudioInputs<E::Node> for ReverbLayer<E> {
    fn inputs(&self) -> Vec<E::Node> {
        vec![self.convolver.clone(), self.dry_node.clone()]
    }
}

impl<E: AudioEngine> LayerControl for ReverbLayer<E> {
    fn layer(&self) -> &Layer {
        &self.layer
    }

    fn on_slide(&self, value: f32) {
        let wet = slider_to_level(value);
        self.dry_gain.borrow_mut().set_manual_level(1.0 - wet);
        self.wet_gain.borrow_mut().set_manual_level(wet);
    }

    fn slider_default(&self) -> Option<u8> {
        Some(REVERB_SLIDER_DEFAULT)
    }
}
