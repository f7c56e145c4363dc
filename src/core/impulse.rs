use super::error::{LayerError, Result};
use rand::Rng;

/// Stereo impulse response for the convolution reverb.
///
/// Each sample is white noise under a `(1 - i/len)^decay` envelope; the two
/// channels are drawn independently so the tail decorrelates left and right.
#[derive(Clone, Debug)]
pub struct ImpulseResponse {
    sample_rate: f32,
    decay: f32,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl ImpulseResponse {
    pub fn generate(sample_rate: f32, seconds: f32, decay: f32) -> Result<Self> {
        Self::generate_with_rng(sample_rate, seconds, decay, &mut rand::thread_rng())
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(
        sample_rate: f32,
        seconds: f32,
        decay: f32,
        rng: &mut R,
    ) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(LayerError::invalid(
                "sample_rate",
                format!("must be positive, got {sample_rate}"),
            ));
        }
        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(LayerError::invalid(
                "seconds",
                format!("must be positive, got {seconds}"),
            ));
        }
        if !(decay.is_finite() && decay > 0.0) {
            return Err(LayerError::invalid(
                "decay",
                format!("must be positive, got {decay}"),
            ));
        }
        let length = impulse_length(sample_rate, seconds);
        if length == 0 {
            return Err(LayerError::invalid(
                "seconds",
                format!("{seconds}s at {sample_rate}Hz is shorter than one sample"),
            ));
        }
        if u32::try_from(length).is_err() {
            return Err(LayerError::invalid(
                "seconds",
                format!("{length} samples exceeds the audio buffer limit"),
            ));
        }

        let mut left = Vec::with_capacity(length);
        let mut right = Vec::with_capacity(length);
        for i in 0..length {
            let env = envelope(i, length, decay);
            left.push(rng.gen_range(-1.0_f32..=1.0) * env);
            right.push(rng.gen_range(-1.0_f32..=1.0) * env);
        }
        Ok(Self {
            sample_rate,
            decay,
            left,
            right,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn left(&self) -> &[f32] {
        &self.left
    }

    pub fn right(&self) -> &[f32] {
        &self.right
    }

    pub fn channels(&self) -> [&[f32]; 2] {
        [&self.left, &self.right]
    }
}

/// Number of samples for `seconds` of audio, rounded to the nearest sample.
#[inline]
pub fn impulse_length(sample_rate: f32, seconds: f32) -> usize {
    (sample_rate as f64 * seconds as f64).round() as usize
}

/// Decay envelope at sample `index` of a `length`-sample impulse.
#[inline]
pub fn envelope(index: usize, length: usize, decay: f32) -> f32 {
    (1.0 - index as f64 / length as f64).powf(decay as f64) as f32
}
