// Error types for the hearing check engine
//
// This module defines custom error types for the threshold test and audio
// output, providing structured error handling with numeric codes that UI
// and reporting layers can branch on.

mod audio;
mod hearing;

pub use audio::{log_audio_error, AudioError, AudioErrorCodes};
pub use hearing::{log_hearing_test_error, HearingTestError, HearingTestErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// library and CLI boundaries.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
