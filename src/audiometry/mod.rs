// Audiometry module - adaptive pure-tone threshold test
//
// This module provides the hearing test engine:
// 1. ThresholdProcedure: per-cell bracketing search and ear/frequency order
// 2. ThresholdGrid: recorded thresholds for both ears
// 3. classify: severity tier of a recorded grid
//
// The test workflow:
// 1. Create ThresholdProcedure and call start()
// 2. Play current_tone(), report heard / not heard until TestComplete
// 3. Classify the grid and hand grid + interpretation to reporting

pub mod grid;
pub mod interpretation;
pub mod levels;
pub mod procedure;
pub mod progress;
pub mod tone;

pub use grid::{AudiogramPoint, ThresholdGrid, TOTAL_CELLS};
pub use interpretation::{classify, Interpretation, SeverityTier};
pub use levels::{Ear, Frequency, DB_LEVELS, MAX_LEVEL_INDEX, START_LEVEL_INDEX};
pub use procedure::{Response, SearchMode, SearchState, StepOutcome, ThresholdProcedure};
pub use progress::TestProgress;
pub use tone::{db_to_gain, ToneParameters, TONE_DURATION_MS};
