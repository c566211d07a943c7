//! Tone synthesis - sample-exact sine bursts for threshold trials
//!
//! Renders one trial tone as an interleaved stereo buffer:
//! - Sine at the trial frequency, amplitude from the dB-to-gain proxy
//! - Opposite ear channel held at exact silence
//! - Short linear fade in/out so onsets do not click
//! - Pure function (deterministic output for identical input)

use std::f64::consts::TAU;

use crate::audiometry::ToneParameters;
use crate::config::PlaybackConfig;
use crate::error::AudioError;

/// Interleaved output channel count (left, right)
pub const CHANNELS: usize = 2;

/// Number of frames covering `duration_ms` at `sample_rate`
#[inline]
pub fn frame_count(sample_rate: u32, duration_ms: u32) -> usize {
    (sample_rate as u64 * duration_ms as u64 / 1000) as usize
}

/// Renders a trial tone as interleaved stereo f32 samples.
///
/// # Arguments
/// * `tone` - Trial parameters (ear, frequency, level, duration)
/// * `config` - Sample rate and fade length
///
/// # Returns
/// * `Ok(Vec<f32>)` - `frames * 2` samples in range [-1.0, 1.0]
/// * `Err(AudioError::InvalidTone)` - Zero sample rate or duration, or a
///   frequency at or above Nyquist
pub fn render_tone(tone: &ToneParameters, config: &PlaybackConfig) -> Result<Vec<f32>, AudioError> {
    if config.sample_rate == 0 {
        return Err(AudioError::InvalidTone {
            reason: "sample rate must be greater than 0".to_string(),
        });
    }
    if tone.duration_ms == 0 {
        return Err(AudioError::InvalidTone {
            reason: "duration must be greater than 0 ms".to_string(),
        });
    }
    if tone.frequency_hz as u64 * 2 >= config.sample_rate as u64 {
        return Err(AudioError::InvalidTone {
            reason: format!(
                "{} Hz cannot be rendered at {} Hz sample rate",
                tone.frequency_hz, config.sample_rate
            ),
        });
    }

    let frames = frame_count(config.sample_rate, tone.duration_ms);
    let ramp_frames = frame_count(config.sample_rate, config.ramp_ms).min(frames / 2);
    let (left_gain, right_gain) = tone.channel_gains();
    let phase_step = TAU * tone.frequency_hz as f64 / config.sample_rate as f64;

    let mut samples = Vec::with_capacity(frames * CHANNELS);
    for i in 0..frames {
        let value = (phase_step * i as f64).sin() as f32 * envelope(i, frames, ramp_frames);
        samples.push(value * left_gain);
        samples.push(value * right_gain);
    }

    Ok(samples)
}

/// Linear fade-in/fade-out gain for frame `i`
#[inline]
fn envelope(i: usize, frames: usize, ramp_frames: usize) -> f32 {
    if ramp_frames == 0 {
        return 1.0;
    }
    let from_edge = i.min(frames - 1 - i);
    if from_edge >= ramp_frames {
        1.0
    } else {
        from_edge as f32 / ramp_frames as f32
    }
}
