use super::constants::{clamp_level, RAMP_WINDOW};
use super::engine::GainControl;
use std::time::Duration;

/// Gain stage that toggles between two fixed levels with linear ramps.
///
/// Every toggle ramps from the instantaneous level to the opposite endpoint,
/// so toggling again mid-ramp re-targets without a jump. The on-state level
/// (`end_level`) can be overridden manually, e.g. from a slider.
pub struct RampingGainNode<G> {
    control: G,
    start_level: f32,
    end_level: f32,
    toggled: bool,
    window: Duration,
}

impl<G: GainControl> RampingGainNode<G> {
    pub fn new(control: G, start_level: f32, end_level: f32) -> Self {
        let start_level = clamp_level(start_level);
        let end_level = clamp_level(end_level);
        let now = control.current_time();
        control.cancel_scheduled_values(now);
        control.set_value_at_time(start_level, now);
        Self {
            control,
            start_level,
            end_level,
            toggled: false,
            window: RAMP_WINDOW,
        }
    }

    pub fn with_ramp_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn toggle(&mut self) {
        let target = self.next_target();
        let now = self.control.current_time();
        let from = self.control.value();
        // Pin the current level so the ramp starts where the output actually is
        self.control.cancel_scheduled_values(now);
        self.control.set_value_at_time(from, now);
        self.control
            .linear_ramp_to_value_at_time(target, now + self.window.as_secs_f64());
        self.toggled = !self.toggled;
        log::debug!(
            "[gain] ramp {:.3} -> {:.3} over {:.2}s",
            from,
            target,
            self.window.as_secs_f64()
        );
    }

    /// Record a new on-state level; applied at once if currently toggled on.
    pub fn set_manual_level(&mut self, level: f32) {
        let level = clamp_level(level);
        if self.toggled {
            let now = self.control.current_time();
            self.control.cancel_scheduled_values(now);
            self.control.set_value_at_time(level, now);
        }
        self.end_level = level;
    }

    pub fn is_toggled(&self) -> bool {
        self.toggled
    }

    pub fn start_level(&self) -> f32 {
        self.start_level
    }

    pub fn end_level(&self) -> f32 {
        self.end_level
    }

    /// Level the output is heading to (or resting at) in the current state.
    pub fn target_level(&self) -> f32 {
        if self.toggled {
            self.end_level
        } else {
            self.start_level
        }
    }

    pub fn ramp_window(&self) -> Duration {
        self.window
    }

    /// Instantaneous output level.
    pub fn level(&self) -> f32 {
        self.control.value()
    }

    pub fn control(&self) -> &G {
        &self.control
    }

    fn next_target(&self) -> f32 {
        if self.toggled {
            self.start_level
        } else {
            self.end_level
        }
    }
}
