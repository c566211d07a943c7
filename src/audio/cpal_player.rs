use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::player::TonePlayer;
use super::synth::{render_tone, CHANNELS};
use crate::audiometry::ToneParameters;
use crate::config::PlaybackConfig;
use crate::error::{log_audio_error, AudioError};

/// Live tone output through the default cpal device
///
/// Each `play` renders the whole tone up front and opens a fresh output
/// stream that reads the buffer once, then outputs silence.
pub struct CpalPlayer {
    device: cpal::Device,
    stream_config: cpal::StreamConfig,
    config: PlaybackConfig,
    /// Active output stream, dropped to stop playback
    output_stream: Option<cpal::Stream>,
}

impl CpalPlayer {
    pub fn new(config: PlaybackConfig) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::StreamOpenFailed {
                reason: format!("Failed to get default output config: {:?}", e),
            })?;

        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(AudioError::StreamOpenFailed {
                reason: "Only F32 sample format is currently supported for output".to_string(),
            });
        }

        let stream_config: cpal::StreamConfig = supported.into();
        // Render at the device rate so no resampling is needed
        let config = PlaybackConfig {
            sample_rate: stream_config.sample_rate.0,
            ..config
        };

        log::info!(
            "[CpalPlayer] Output device ready: {} channels @ {} Hz",
            stream_config.channels,
            stream_config.sample_rate.0
        );

        Ok(Self {
            device,
            stream_config,
            config,
            output_stream: None,
        })
    }

    fn create_output_stream(&self, samples: Arc<Vec<f32>>) -> Result<cpal::Stream, AudioError> {
        let channels_count = self.stream_config.channels as usize;
        let position = Arc::new(AtomicUsize::new(0));

        let err_fn = |err| log::error!("[CpalPlayer] Output stream error: {}", err);

        self.device
            .build_output_stream(
                &self.stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut pos = position.load(Ordering::Relaxed);
                    for frame in data.chunks_mut(channels_count) {
                        let (left, right) = if pos + 1 < samples.len() {
                            (samples[pos], samples[pos + 1])
                        } else {
                            (0.0, 0.0)
                        };
                        pos += CHANNELS;

                        match frame.len() {
                            1 => frame[0] = left + right,
                            _ => {
                                frame[0] = left;
                                frame[1] = right;
                                for extra in frame.iter_mut().skip(2) {
                                    *extra = 0.0;
                                }
                            }
                        }
                    }
                    position.store(pos, Ordering::Relaxed);
                },
                err_fn,
                None,
            )
            .map_err(|e| AudioError::StreamOpenFailed {
                reason: format!("{:?}", e),
            })
    }
}

impl TonePlayer for CpalPlayer {
    fn play(&mut self, tone: &ToneParameters) -> Result<(), AudioError> {
        self.stop();

        let samples = Arc::new(render_tone(tone, &self.config)?);
        let stream = self
            .create_output_stream(samples)
            .inspect_err(|err| log_audio_error(err, "CpalPlayer::play"))?;
        stream.play().map_err(|e| AudioError::StreamOpenFailed {
            reason: format!("Failed to start output stream: {:?}", e),
        })?;

        self.output_stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        self.output_stream = None;
    }
}
