use super::error::Result;
use super::impulse::ImpulseResponse;

/// Automation surface of a gain primitive, on the engine's own timeline (seconds).
///
/// Mirrors the subset of `AudioParam` the layers need. Implementations apply
/// the calls in order; failures are theirs to log.
pub trait GainControl {
    fn current_time(&self) -> f64;
    /// Instantaneous level at `current_time()`.
    fn value(&self) -> f32;
    fn cancel_scheduled_values(&self, from: f64);
    fn set_value_at_time(&self, value: f32, at: f64);
    fn linear_ramp_to_value_at_time(&self, value: f32, end: f64);
}

/// Node factory and router the layers build their graph with.
#[allow(async_fn_in_trait)]
pub trait AudioEngine {
    /// Any connectable node.
    type Node: Clone + 'static;
    type Gain: GainControl + 'static;
    /// A decoded, playable sample.
    type Buffer;

    fn sample_rate(&self) -> f32;
    fn destination(&self) -> Self::Node;
    fn create_gain(&self) -> Result<Self::Gain>;
    fn gain_node(&self, gain: &Self::Gain) -> Self::Node;
    /// A buffer-backed source with looping enabled and no buffer yet.
    fn create_loop_source(&self) -> Result<Self::Node>;
    fn create_convolver(&self, impulse: &ImpulseResponse) -> Result<Self::Node>;
    fn connect(&self, from: &Self::Node, to: &Self::Node) -> Result<()>;
    async fn decode(&self, bytes: Vec<u8>) -> Result<Self::Buffer>;
    fn set_loop_buffer(&self, source: &Self::Node, buffer: Self::Buffer) -> Result<()>;
    fn start_loop(&self, source: &Self::Node) -> Result<()>;
}

/// Resolves asset URLs to bytes.
#[allow(async_fn_in_trait)]
pub trait AssetSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Something other layers can route their output into.
pub trait AudioInputs<N> {
    fn inputs(&self) -> Vec<N>;
}
