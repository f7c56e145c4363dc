use std::time::Duration;

// Shared tuning constants for the layer model.

// Gain ramps
pub const RAMP_WINDOW: Duration = Duration::from_secs(1); // length of every toggle ramp

// Image transitions
pub const TRANSITION_DELAY: Duration = Duration::from_millis(2000); // hold time of a transition frame
pub const FLASH_DELAY: Duration = Duration::from_millis(2000); // reverb layer's forced second step

// Loop layers: silent when off, full level when on
pub const LOOP_GAIN_OFF: f32 = 0.0;
pub const LOOP_GAIN_ON: f32 = 1.0;

// Reverb mix endpoints (off -> on)
pub const DRY_GAIN_OFF: f32 = 1.0;
pub const DRY_GAIN_ON: f32 = 0.5;
pub const WET_GAIN_OFF: f32 = 0.0;
pub const WET_GAIN_ON: f32 = 0.5;

// Generated impulse response
pub const REVERB_SECONDS: f32 = 1.0;
pub const REVERB_DECAY: f32 = 0.5;

// Sliders report integers in [SLIDER_MIN, SLIDER_MAX]
pub const SLIDER_MIN: f32 = 0.0;
pub const SLIDER_MAX: f32 = 100.0;
pub const LOOP_SLIDER_DEFAULT: u8 = 100;
pub const REVERB_SLIDER_DEFAULT: u8 = 50;

/// Clamp a gain level into [0, 1]. NaN maps to silence.
#[inline]
pub fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// Map a slider reading onto a gain level.
#[inline]
pub fn slider_to_level(value: f32) -> f32 {
    clamp_level(value / SLIDER_MAX)
}
