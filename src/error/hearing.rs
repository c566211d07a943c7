// Threshold test error types and constants

use crate::audiometry::{Ear, Frequency};
use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Threshold test error code constants
///
/// Error code range: 2001-2006
pub struct HearingTestErrorCodes {}

impl HearingTestErrorCodes {
    /// A response arrived while no frequency search was running
    pub const NO_ACTIVE_SEARCH: i32 = 2001;

    /// A search was started while another pair was still in progress
    pub const SEARCH_ALREADY_ACTIVE: i32 = 2002;

    /// All cells are filled; no further searches can start
    pub const TEST_COMPLETE: i32 = 2003;

    /// Classification was requested on an incomplete grid
    pub const INSUFFICIENT_DATA: i32 = 2004;

    /// A threshold value is not on the level ladder
    pub const INVALID_THRESHOLD: i32 = 2005;

    /// A serialized grid could not be parsed
    pub const MALFORMED_GRID: i32 = 2006;
}

/// Log a threshold test error with structured context
///
/// Emits the numeric code, the failing component and the message so log
/// consumers can filter without parsing free text.
pub fn log_hearing_test_error(err: &HearingTestError, context: &str) {
    error!(
        "Hearing test error in {}: code={}, component=ThresholdProcedure, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Threshold test errors
///
/// Error code ranges: 2001-2006
#[derive(Debug, Clone, PartialEq)]
pub enum HearingTestError {
    /// Heard / not heard reported with no search running
    NoActiveSearch,

    /// A different (ear, frequency) search has not finished yet
    SearchAlreadyActive { ear: Ear, frequency: Frequency },

    /// The grid is already full
    TestComplete,

    /// Grid is missing cells for one or both ears
    InsufficientData { left_cells: usize, right_cells: usize },

    /// Threshold is not one of the ladder levels
    InvalidThreshold { db: i32 },

    /// Grid input could not be parsed
    MalformedGrid { reason: String },
}

impl ErrorCode for HearingTestError {
    fn code(&self) -> i32 {
        match self {
            HearingTestError::NoActiveSearch => HearingTestErrorCodes::NO_ACTIVE_SEARCH,
            HearingTestError::SearchAlreadyActive { .. } => {
                HearingTestErrorCodes::SEARCH_ALREADY_ACTIVE
            }
            HearingTestError::TestComplete => HearingTestErrorCodes::TEST_COMPLETE,
            HearingTestError::InsufficientData { .. } => HearingTestErrorCodes::INSUFFICIENT_DATA,
            HearingTestError::InvalidThreshold { .. } => HearingTestErrorCodes::INVALID_THRESHOLD,
            HearingTestError::MalformedGrid { .. } => HearingTestErrorCodes::MALFORMED_GRID,
        }
    }

    fn message(&self) -> String {
        match self {
            HearingTestError::NoActiveSearch => {
                "No frequency search in progress. Call start_frequency_search() first.".to_string()
            }
            HearingTestError::SearchAlreadyActive { ear, frequency } => {
                format!("Search for {} ear at {} still in progress", ear, frequency)
            }
            HearingTestError::TestComplete => "All thresholds already recorded".to_string(),
            HearingTestError::InsufficientData {
                left_cells,
                right_cells,
            } => format!(
                "Insufficient data for analysis: left={}, right={}",
                left_cells, right_cells
            ),
            HearingTestError::InvalidThreshold { db } => {
                format!("Threshold {} dB is not a test level", db)
            }
            HearingTestError::MalformedGrid { reason } => {
                format!("Malformed threshold grid: {}", reason)
            }
        }
    }
}

impl fmt::Display for HearingTestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HearingTestError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for HearingTestError {}

impl From<serde_json::Error> for HearingTestError {
    fn from(err: serde_json::Error) -> Self {
        HearingTestError::MalformedGrid {
            reason: err.to_string(),
        }
    }
}
