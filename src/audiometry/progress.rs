// Progress tracking for the threshold test
//
// Snapshot type read by progress UIs: which ear and frequency are being
// tested, at what level, and how many of the twelve cells are done.

use serde::{Deserialize, Serialize};

use crate::audiometry::levels::{Ear, Frequency};

/// Progress information for the current trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestProgress {
    /// Ear under test, `None` when no search is running
    pub ear: Option<Ear>,
    /// Frequency under test, `None` when no search is running
    pub frequency: Option<Frequency>,
    /// Level of the current tone in dB
    pub level_db: Option<i32>,
    /// Number of thresholds recorded so far (0-12)
    pub completed_cells: usize,
    /// Total thresholds in a full test
    pub total_cells: usize,
}

impl TestProgress {
    /// Check if every threshold has been recorded
    pub fn is_complete(&self) -> bool {
        self.completed_cells >= self.total_cells
    }

    /// Get progress percentage (0-100)
    pub fn percentage(&self) -> u8 {
        if self.total_cells == 0 {
            return 0;
        }
        ((self.completed_cells as f32 / self.total_cells as f32) * 100.0) as u8
    }

    /// One-line status, e.g. "Left ear, 1000 Hz at 30 dB (2/12)"
    pub fn status_line(&self) -> String {
        match (self.ear, self.frequency, self.level_db) {
            (Some(ear), Some(frequency), Some(level_db)) => format!(
                "{}, {} at {} dB ({}/{})",
                ear.display_name(),
                frequency,
                level_db,
                self.completed_cells,
                self.total_cells
            ),
            _ => format!("Idle ({}/{})", self.completed_cells, self.total_cells),
        }
    }
}
