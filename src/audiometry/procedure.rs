// ThresholdProcedure - adaptive pure-tone threshold search
//
// Each (ear, frequency) cell runs a two-mode bracketing search starting at
// 30 dB:
// 1. Descending: every "heard" drops the level by 10 dB (two ladder steps)
// 2. AscendingAfterMiss: entered on the first "not heard"; every miss raises
//    the level by 5 dB and the next "heard" fixes the threshold
//
// The mode flips at most once per cell and never reverts. After a threshold
// is recorded the procedure moves to the next frequency, then to the right
// ear, and reports completion exactly once when all twelve cells are filled.

use serde::{Deserialize, Serialize};

use crate::audiometry::grid::{ThresholdGrid, TOTAL_CELLS};
use crate::audiometry::interpretation::{classify, Interpretation};
use crate::audiometry::levels::{Ear, Frequency, DB_LEVELS, MAX_LEVEL_INDEX, START_LEVEL_INDEX};
use crate::audiometry::progress::TestProgress;
use crate::audiometry::tone::ToneParameters;
use crate::error::{log_hearing_test_error, HearingTestError};

/// Ladder steps taken per "heard" while descending (10 dB)
const COARSE_STEP: usize = 2;

/// Ladder steps taken per "not heard" (5 dB)
const FINE_STEP: usize = 1;

/// Listener response to one presented tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Heard,
    NotHeard,
}

/// Search direction for the active cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// No miss yet; bracketing downward in 10 dB steps
    Descending,
    /// At least one miss; climbing in 5 dB steps until heard
    AscendingAfterMiss,
}

/// What the search did with one response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchStep {
    Continue,
    Finalize,
}

/// Search state for the single active (ear, frequency) cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    ear: Ear,
    frequency: Frequency,
    level_index: usize,
    mode: SearchMode,
    trials: u32,
}

impl SearchState {
    fn new(ear: Ear, frequency: Frequency) -> Self {
        Self {
            ear,
            frequency,
            level_index: START_LEVEL_INDEX,
            mode: SearchMode::Descending,
            trials: 0,
        }
    }

    pub fn ear(&self) -> Ear {
        self.ear
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level_db(&self) -> i32 {
        DB_LEVELS[self.level_index]
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Responses applied to this cell so far
    pub fn trials(&self) -> u32 {
        self.trials
    }

    pub fn tone(&self) -> ToneParameters {
        ToneParameters::new(self.ear, self.frequency, self.level_db())
    }

    fn apply(&mut self, response: Response) -> SearchStep {
        self.trials += 1;
        match (self.mode, response) {
            (SearchMode::Descending, Response::Heard) => {
                match self.level_index.checked_sub(COARSE_STEP) {
                    Some(index) => {
                        self.level_index = index;
                        SearchStep::Continue
                    }
                    None => {
                        self.level_index = 0;
                        SearchStep::Finalize
                    }
                }
            }
            (SearchMode::AscendingAfterMiss, Response::Heard) => SearchStep::Finalize,
            (_, Response::NotHeard) => {
                self.mode = SearchMode::AscendingAfterMiss;
                if self.level_index < MAX_LEVEL_INDEX {
                    self.level_index += FINE_STEP;
                    SearchStep::Continue
                } else {
                    SearchStep::Finalize
                }
            }
        }
    }
}

/// Result of applying one response
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Same cell, replay the tone at the new level
    Continue(ToneParameters),
    /// Threshold recorded and the search for the next cell has started
    ThresholdRecorded {
        ear: Ear,
        frequency: Frequency,
        threshold_db: i32,
        trials: u32,
        next: ToneParameters,
    },
    /// Last threshold recorded; emitted once per procedure
    TestComplete {
        ear: Ear,
        frequency: Frequency,
        threshold_db: i32,
        trials: u32,
    },
}

impl StepOutcome {
    /// Tone the caller should play next, if any
    pub fn next_tone(&self) -> Option<ToneParameters> {
        match self {
            StepOutcome::Continue(tone) => Some(*tone),
            StepOutcome::ThresholdRecorded { next, .. } => Some(*next),
            StepOutcome::TestComplete { .. } => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, StepOutcome::TestComplete { .. })
    }
}

/// ThresholdProcedure owns the active search and the in-progress grid
#[derive(Debug, Clone, Default)]
pub struct ThresholdProcedure {
    search: Option<SearchState>,
    grid: ThresholdGrid,
    completion_signaled: bool,
    total_trials: u32,
}

impl ThresholdProcedure {
    /// Create a procedure with an empty grid and no active search
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at the first unrecorded cell in test order (left 250 Hz on a
    /// fresh procedure)
    pub fn start(&mut self) -> Result<ToneParameters, HearingTestError> {
        let (ear, frequency) = self
            .next_pending_cell(None)
            .ok_or(HearingTestError::TestComplete)?;
        self.start_frequency_search(ear, frequency)
    }

    /// Begin (or restart) the search for one cell at 30 dB, descending
    ///
    /// # Returns
    /// * `Ok(ToneParameters)` - First tone to play for this cell
    /// * `Err(SearchAlreadyActive)` - A different cell is still being searched
    /// * `Err(TestComplete)` - The grid is already full
    pub fn start_frequency_search(
        &mut self,
        ear: Ear,
        frequency: Frequency,
    ) -> Result<ToneParameters, HearingTestError> {
        if self.grid.is_complete() {
            return Err(HearingTestError::TestComplete);
        }
        if let Some(active) = &self.search {
            if active.ear != ear || active.frequency != frequency {
                let err = HearingTestError::SearchAlreadyActive {
                    ear: active.ear,
                    frequency: active.frequency,
                };
                log_hearing_test_error(&err, "start_frequency_search");
                return Err(err);
            }
        }

        let state = SearchState::new(ear, frequency);
        let tone = state.tone();
        log::debug!(
            "[ThresholdProcedure] Search started: ear={}, frequency={}, level={} dB",
            ear,
            frequency,
            tone.level_db
        );
        self.search = Some(state);
        Ok(tone)
    }

    /// Listener heard the current tone
    pub fn report_heard(&mut self) -> Result<StepOutcome, HearingTestError> {
        self.respond(Response::Heard)
    }

    /// Listener did not hear the current tone
    pub fn report_not_heard(&mut self) -> Result<StepOutcome, HearingTestError> {
        self.respond(Response::NotHeard)
    }

    /// Apply one response to the active search
    ///
    /// # Returns
    /// * `Ok(StepOutcome)` - Next action for the caller
    /// * `Err(NoActiveSearch)` - No search is running
    pub fn respond(&mut self, response: Response) -> Result<StepOutcome, HearingTestError> {
        let Some(search) = self.search.as_mut() else {
            let err = HearingTestError::NoActiveSearch;
            log_hearing_test_error(&err, "respond");
            return Err(err);
        };

        self.total_trials += 1;
        match search.apply(response) {
            SearchStep::Continue => {
                log::trace!(
                    "[ThresholdProcedure] {:?} -> {} dB ({:?})",
                    response,
                    search.level_db(),
                    search.mode()
                );
                Ok(StepOutcome::Continue(search.tone()))
            }
            SearchStep::Finalize => self.finalize(),
        }
    }

    /// Record the active level as the threshold and advance
    fn finalize(&mut self) -> Result<StepOutcome, HearingTestError> {
        let search = self.search.take().ok_or(HearingTestError::NoActiveSearch)?;
        let threshold_db = search.level_db();
        self.grid.record(search.ear, search.frequency, threshold_db)?;

        log::info!(
            "[ThresholdProcedure] Threshold recorded: ear={}, frequency={}, threshold={} dB, trials={}",
            search.ear,
            search.frequency,
            threshold_db,
            search.trials
        );

        match self.next_pending_cell(Some((search.ear, search.frequency))) {
            Some((ear, frequency)) => {
                let next = SearchState::new(ear, frequency);
                let tone = next.tone();
                self.search = Some(next);
                Ok(StepOutcome::ThresholdRecorded {
                    ear: search.ear,
                    frequency: search.frequency,
                    threshold_db,
                    trials: search.trials,
                    next: tone,
                })
            }
            None if !self.completion_signaled => {
                self.completion_signaled = true;
                log::info!(
                    "[ThresholdProcedure] Test complete after {} trials",
                    self.total_trials
                );
                Ok(StepOutcome::TestComplete {
                    ear: search.ear,
                    frequency: search.frequency,
                    threshold_db,
                    trials: search.trials,
                })
            }
            None => Err(HearingTestError::TestComplete),
        }
    }

    /// First unrecorded cell in test order after `after` (wrapping), or from
    /// the beginning when `after` is `None`
    fn next_pending_cell(&self, after: Option<(Ear, Frequency)>) -> Option<(Ear, Frequency)> {
        let order: Vec<(Ear, Frequency)> = Ear::ALL
            .iter()
            .flat_map(|&ear| Frequency::ALL.iter().map(move |&frequency| (ear, frequency)))
            .collect();
        let offset = after
            .and_then(|cell| order.iter().position(|&c| c == cell))
            .map(|position| position + 1)
            .unwrap_or(0);

        (0..order.len())
            .map(|i| order[(offset + i) % order.len()])
            .find(|&(ear, frequency)| self.grid.get(ear, frequency).is_none())
    }

    /// Tone for the active search, `None` when idle or complete
    pub fn current_tone(&self) -> Option<ToneParameters> {
        self.search.as_ref().map(SearchState::tone)
    }

    pub fn search_state(&self) -> Option<&SearchState> {
        self.search.as_ref()
    }

    pub fn grid(&self) -> &ThresholdGrid {
        &self.grid
    }

    /// Consume the procedure, keeping only the recorded thresholds
    pub fn into_grid(self) -> ThresholdGrid {
        self.grid
    }

    pub fn is_complete(&self) -> bool {
        self.grid.is_complete()
    }

    /// Responses applied across all cells
    pub fn total_trials(&self) -> u32 {
        self.total_trials
    }

    /// Get current test progress
    pub fn progress(&self) -> TestProgress {
        TestProgress {
            ear: self.search.as_ref().map(SearchState::ear),
            frequency: self.search.as_ref().map(SearchState::frequency),
            level_db: self.search.as_ref().map(SearchState::level_db),
            completed_cells: self.grid.completed_cells(),
            total_cells: TOTAL_CELLS,
        }
    }

    /// Classify the recorded grid
    pub fn classify(&self) -> Result<Interpretation, HearingTestError> {
        classify(&self.grid).inspect_err(|err| log_hearing_test_error(err, "classify"))
    }

    /// Discard all recorded thresholds and the active search
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
#[path = "procedure_tests.rs"]
mod tests;
