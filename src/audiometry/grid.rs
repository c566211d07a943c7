// ThresholdGrid - per-ear, per-frequency threshold storage
//
// Cells are filled one at a time as frequency searches terminate. The grid
// serializes as `{"left": {"250": 20, ...}, "right": {...}}`, the shape the
// chart, report and CRM collaborators consume.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::audiometry::levels::{level_index, Ear, Frequency};
use crate::error::HearingTestError;

/// Number of cells in a complete grid (6 frequencies x 2 ears)
pub const TOTAL_CELLS: usize = Frequency::ALL.len() * Ear::ALL.len();

/// Reference curve for excellent hearing, drawn next to the user's audiogram
pub const REFERENCE_NORMAL_DB: [i32; 6] = [-5, 0, -5, 0, 5, 0];

/// Recorded thresholds in dB, keyed by ear then frequency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdGrid {
    #[serde(default)]
    left: BTreeMap<Frequency, i32>,
    #[serde(default)]
    right: BTreeMap<Frequency, i32>,
}

/// One plotted point of an audiogram curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudiogramPoint {
    pub frequency_hz: u32,
    pub db: i32,
}

impl ThresholdGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a threshold for one cell
    ///
    /// # Returns
    /// * `Ok(())` - Cell written (an existing value is replaced)
    /// * `Err(HearingTestError::InvalidThreshold)` - `db` is not a ladder level
    pub fn record(
        &mut self,
        ear: Ear,
        frequency: Frequency,
        db: i32,
    ) -> Result<(), HearingTestError> {
        if level_index(db).is_none() {
            return Err(HearingTestError::InvalidThreshold { db });
        }
        self.ear_mut(ear).insert(frequency, db);
        Ok(())
    }

    /// Parse a grid from its JSON form, rejecting values off the level ladder
    pub fn from_json(json: &str) -> Result<Self, HearingTestError> {
        let grid: ThresholdGrid = serde_json::from_str(json)?;
        if let Some(db) = grid.values().find(|db| level_index(*db).is_none()) {
            return Err(HearingTestError::InvalidThreshold { db });
        }
        Ok(grid)
    }

    pub fn get(&self, ear: Ear, frequency: Frequency) -> Option<i32> {
        self.ear(ear).get(&frequency).copied()
    }

    /// Thresholds of one ear, ordered by frequency
    pub fn ear(&self, ear: Ear) -> &BTreeMap<Frequency, i32> {
        match ear {
            Ear::Left => &self.left,
            Ear::Right => &self.right,
        }
    }

    fn ear_mut(&mut self, ear: Ear) -> &mut BTreeMap<Frequency, i32> {
        match ear {
            Ear::Left => &mut self.left,
            Ear::Right => &mut self.right,
        }
    }

    pub fn ear_cell_count(&self, ear: Ear) -> usize {
        self.ear(ear).len()
    }

    /// Number of filled cells across both ears
    pub fn completed_cells(&self) -> usize {
        self.left.len() + self.right.len()
    }

    pub fn is_complete(&self) -> bool {
        self.completed_cells() == TOTAL_CELLS
    }

    /// All recorded thresholds, left ear first
    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        self.left.values().chain(self.right.values()).copied()
    }

    /// Mean threshold of one ear, `None` if the ear has no cells
    pub fn ear_average(&self, ear: Ear) -> Option<f64> {
        mean(self.ear(ear).values().copied())
    }

    /// Mean threshold over every recorded cell, `None` if the grid is empty
    pub fn average(&self) -> Option<f64> {
        mean(self.values())
    }

    /// Audiogram curve for one ear, in test frequency order
    pub fn audiogram(&self, ear: Ear) -> Vec<AudiogramPoint> {
        self.ear(ear)
            .iter()
            .map(|(frequency, &db)| AudiogramPoint {
                frequency_hz: frequency.hz(),
                db,
            })
            .collect()
    }

    /// Reference "normal hearing" curve
    pub fn reference_audiogram() -> Vec<AudiogramPoint> {
        Frequency::ALL
            .iter()
            .zip(REFERENCE_NORMAL_DB)
            .map(|(frequency, db)| AudiogramPoint {
                frequency_hz: frequency.hz(),
                db,
            })
            .collect()
    }
}

fn mean(values: impl Iterator<Item = i32>) -> Option<f64> {
    let (sum, count) = values.fold((0i64, 0usize), |(sum, count), db| {
        (sum + db as i64, count + 1)
    });
    if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    }
}
