// Hearing Check Core - adaptive pure-tone hearing self-assessment
// Threshold search engine, severity interpretation and tone playback

// Module declarations
pub mod audio;
pub mod audiometry;
pub mod config;
pub mod error;
pub mod report;
pub mod session;
pub mod telemetry;
pub mod testing;

// Re-exports for convenience
pub use audiometry::{
    classify, Ear, Frequency, Interpretation, Response, SeverityTier, StepOutcome,
    ThresholdGrid, ThresholdProcedure, ToneParameters,
};
pub use config::AppConfig;
pub use error::{AudioError, ErrorCode, HearingTestError};
pub use report::ResultsReport;
pub use session::HearingTestSession;

/// Install the fmt subscriber for CLI and test binaries
///
/// `verbose` lowers the level from INFO to DEBUG. `log` records from the
/// engine are picked up too. Calling this twice is a no-op.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(false);
        init_logging(true);
    }
}
