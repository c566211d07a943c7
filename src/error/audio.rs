// Audio error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Audio error code constants
///
/// Error code range: 1001-1005
pub struct AudioErrorCodes {}

impl AudioErrorCodes {
    /// Tone parameters cannot be rendered
    pub const INVALID_TONE: i32 = 1001;

    /// No default output device found
    pub const NO_OUTPUT_DEVICE: i32 = 1002;

    /// Failed to open audio stream
    pub const STREAM_OPEN_FAILED: i32 = 1003;

    /// Writing a WAV file failed
    pub const WAV_WRITE: i32 = 1004;

    /// Crate built without live playback support
    pub const PLAYBACK_UNAVAILABLE: i32 = 1005;
}

/// Log an audio error with structured context
pub fn log_audio_error(err: &AudioError, context: &str) {
    error!(
        "Audio error in {}: code={}, component=TonePlayer, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Audio-related errors
///
/// These errors cover tone rendering, WAV export and live output streams.
///
/// Error code ranges: 1001-1005
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// Tone parameters or playback settings are unusable
    InvalidTone { reason: String },

    /// No default output device found
    NoOutputDevice,

    /// Failed to open audio stream
    StreamOpenFailed { reason: String },

    /// Writing a WAV file failed
    WavWrite { reason: String },

    /// Live playback requested but the `playback` feature is disabled
    PlaybackUnavailable,
}

impl ErrorCode for AudioError {
    fn code(&self) -> i32 {
        match self {
            AudioError::InvalidTone { .. } => AudioErrorCodes::INVALID_TONE,
            AudioError::NoOutputDevice => AudioErrorCodes::NO_OUTPUT_DEVICE,
            AudioError::StreamOpenFailed { .. } => AudioErrorCodes::STREAM_OPEN_FAILED,
            AudioError::WavWrite { .. } => AudioErrorCodes::WAV_WRITE,
            AudioError::PlaybackUnavailable => AudioErrorCodes::PLAYBACK_UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            AudioError::InvalidTone { reason } => format!("Invalid tone: {}", reason),
            AudioError::NoOutputDevice => "No default output device found".to_string(),
            AudioError::StreamOpenFailed { reason } => {
                format!("Failed to open audio stream: {}", reason)
            }
            AudioError::WavWrite { reason } => format!("Failed to write WAV: {}", reason),
            AudioError::PlaybackUnavailable => {
                "Live playback not compiled in. Rebuild with --features playback.".to_string()
            }
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AudioError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AudioError {}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        AudioError::WavWrite {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_error_codes() {
        assert_eq!(
            AudioError::InvalidTone {
                reason: "x".to_string()
            }
            .code(),
            1001
        );
        assert_eq!(AudioError::NoOutputDevice.code(), 1002);
        assert_eq!(
            AudioError::StreamOpenFailed {
                reason: "x".to_string()
            }
            .code(),
            1003
        );
        assert_eq!(
            AudioError::WavWrite {
                reason: "x".to_string()
            }
            .code(),
            1004
        );
        assert_eq!(AudioError::PlaybackUnavailable.code(), 1005);
    }

    #[test]
    fn test_audio_error_messages() {
        let err = AudioError::StreamOpenFailed {
            reason: "device busy".to_string(),
        };
        assert_eq!(err.message(), "Failed to open audio stream: device busy");
        assert!(AudioError::PlaybackUnavailable
            .message()
            .contains("--features playback"));
    }

    #[test]
    fn test_audio_error_display() {
        let err = AudioError::NoOutputDevice;
        let display = format!("{}", err);
        assert!(display.contains("AudioError"));
        assert!(display.contains("1002"));
    }
}
