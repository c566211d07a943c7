// WAV export of rendered trial tones

use std::path::Path;

use crate::audio::synth::{render_tone, CHANNELS};
use crate::audiometry::ToneParameters;
use crate::config::PlaybackConfig;
use crate::error::AudioError;

/// Render `tone` and write it as a 32-bit float stereo WAV file
///
/// # Returns
/// Number of frames written
pub fn write_tone_wav<P: AsRef<Path>>(
    path: P,
    tone: &ToneParameters,
    config: &PlaybackConfig,
) -> Result<usize, AudioError> {
    let samples = render_tone(tone, config)?;
    let spec = hound::WavSpec {
        channels: CHANNELS as u16,
        sample_rate: config.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path.as_ref(), spec)?;
    for sample in &samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;

    log::info!(
        "[Wav] Wrote {} ear {} Hz @ {} dB to {:?}",
        tone.ear,
        tone.frequency_hz,
        tone.level_db,
        path.as_ref()
    );
    Ok(samples.len() / CHANNELS)
}
