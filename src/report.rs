//! Results report handed to chart, PDF, CRM and email collaborators.
//!
//! Bundles the grid, its interpretation, rounded averages and audiogram
//! series as plain serializable data, plus a plain-text summary used for
//! appointment notes and emails.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::audiometry::{classify, AudiogramPoint, Ear, Interpretation, ThresholdGrid};
use crate::config::ReportConfig;
use crate::error::HearingTestError;

/// Audiogram curves for both ears plus the normal-hearing reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudiogramSeries {
    pub left: Vec<AudiogramPoint>,
    pub right: Vec<AudiogramPoint>,
    pub reference: Vec<AudiogramPoint>,
}

/// Final results of one test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsReport {
    pub results: ThresholdGrid,
    pub interpretation: Interpretation,
    /// Overall mean, rounded half up
    pub average_db: i32,
    pub left_ear_avg_db: i32,
    pub right_ear_avg_db: i32,
    pub audiogram: AudiogramSeries,
}

/// Round half up (2.5 -> 3, -2.5 -> -2), the rounding CRM fields use
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

impl ResultsReport {
    /// Classify `grid` and assemble the report
    ///
    /// # Returns
    /// * `Ok(ResultsReport)` - Both ears have thresholds
    /// * `Err(HearingTestError::InsufficientData)` - Either ear is empty
    pub fn from_grid(grid: &ThresholdGrid) -> Result<Self, HearingTestError> {
        let interpretation = classify(grid)?;
        let ear_average = |ear| grid.ear_average(ear).map(round_half_up).unwrap_or(0);

        Ok(Self {
            results: grid.clone(),
            average_db: round_half_up(interpretation.average_db),
            left_ear_avg_db: ear_average(Ear::Left),
            right_ear_avg_db: ear_average(Ear::Right),
            audiogram: AudiogramSeries {
                left: grid.audiogram(Ear::Left),
                right: grid.audiogram(Ear::Right),
                reference: ThresholdGrid::reference_audiogram(),
            },
            interpretation,
        })
    }

    /// Plain-text summary for appointment notes and emails
    pub fn to_text(&self, config: &ReportConfig) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Hearing test results ===");

        for (ear, average) in [
            (Ear::Left, self.left_ear_avg_db),
            (Ear::Right, self.right_ear_avg_db),
        ] {
            let _ = writeln!(out, "{}:", ear.display_name());
            if config.include_per_frequency {
                for (frequency, db) in self.results.ear(ear) {
                    let _ = writeln!(out, "  {}: {} dB", frequency, db);
                }
            }
            let _ = writeln!(out, "  Average threshold: {} dB", average);
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "Overall average threshold: {} dB", self.average_db);
        let _ = writeln!(out);
        let _ = writeln!(out, "=== Result ===");
        let _ = writeln!(out, "Diagnosis: {}", self.interpretation.label);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.interpretation.description);
        let _ = writeln!(
            out,
            "Recommended device: {}",
            self.interpretation.device_recommendation
        );
        out
    }
}
