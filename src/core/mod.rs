// Platform-independent layer model. Nothing here touches web-sys, so the
// host-side tests can pull these files in directly.

pub mod buffer_layer;
pub mod constants;
pub mod engine;
pub mod error;
pub mod impulse;
pub mod layer;
pub mod ramp;
pub mod reverb_layer;
pub mod scene;

pub use buffer_layer::{BufferLayer, BufferLayerConfig};
pub use engine::{AssetSource, AudioEngine, AudioInputs, GainControl};
pub use error::{LayerError, Result};
pub use impulse::ImpulseResponse;
pub use layer::{Frame, LayerConfig, LayerControl, Presenter, Scheduler, TaskHandle};
pub use reverb_layer::{ReverbLayer, ReverbLayerConfig};
pub use scene::{start_when_loaded, Scene, SceneConfig, ScenePresenters};
