// HearingTestSession: drives one threshold test end to end
//
// Single Responsibility: wire the threshold procedure to a tone player and
// the session telemetry. Every response stops the current tone, advances
// the procedure and immediately presents the next tone. Dropping the session
// abandons the test; partially recorded cells are discarded with it.

use tokio::sync::broadcast;

use crate::audio::TonePlayer;
use crate::audiometry::{
    Ear, Response, StepOutcome, TestProgress, ThresholdGrid, ThresholdProcedure, ToneParameters,
};
use crate::config::AppConfig;
use crate::error::{log_audio_error, ErrorCode, HearingTestError};
use crate::report::ResultsReport;
use crate::telemetry::{SessionEvent, SessionTelemetry, TelemetrySnapshot};

/// Owns the procedure, the player and the event log for one test run
///
/// # Example
/// ```ignore
/// let mut session = HearingTestSession::new(RecordingPlayer::new(), &AppConfig::default());
/// session.start()?;
/// while !session.is_complete() {
///     session.respond(ask_listener())?;
/// }
/// let report = session.report()?;
/// ```
pub struct HearingTestSession<P: TonePlayer> {
    procedure: ThresholdProcedure,
    player: P,
    telemetry: SessionTelemetry,
    tone_duration_ms: u32,
}

impl<P: TonePlayer> HearingTestSession<P> {
    pub fn new(player: P, config: &AppConfig) -> Self {
        Self {
            procedure: ThresholdProcedure::new(),
            player,
            telemetry: SessionTelemetry::from_config(&config.telemetry),
            tone_duration_ms: config.playback.tone_duration_ms,
        }
    }

    /// Begin the test at left ear, 250 Hz and play the first tone
    pub fn start(&mut self) -> Result<ToneParameters, HearingTestError> {
        let tone = self
            .procedure
            .start()
            .inspect_err(|err| self.record_error(err, "start"))?;
        tracing::info!(
            ear = %tone.ear,
            frequency_hz = tone.frequency_hz,
            "hearing test started"
        );
        self.publish_search_started(&tone);
        Ok(self.present(tone))
    }

    /// Apply the listener's response and present whatever comes next
    ///
    /// # Returns
    /// * `Ok(StepOutcome)` - Next step; a tone is already playing unless the
    ///   outcome is `TestComplete`
    /// * `Err(NoActiveSearch)` - Session not started or already complete
    pub fn respond(&mut self, response: Response) -> Result<StepOutcome, HearingTestError> {
        let level_db = self.procedure.current_tone().map(|tone| tone.level_db);
        self.player.stop();

        let outcome = self
            .procedure
            .respond(response)
            .inspect_err(|err| self.record_error(err, "respond"))?;
        if let Some(level_db) = level_db {
            self.telemetry
                .publish(SessionEvent::ResponseRecorded { response, level_db });
        }

        match outcome {
            StepOutcome::Continue(tone) => {
                self.present(tone);
            }
            StepOutcome::ThresholdRecorded {
                ear,
                frequency,
                threshold_db,
                trials,
                next,
            } => {
                self.telemetry.publish(SessionEvent::ThresholdRecorded {
                    ear,
                    frequency,
                    threshold_db,
                    trials,
                });
                self.publish_search_started(&next);
                self.present(next);
            }
            StepOutcome::TestComplete {
                ear,
                frequency,
                threshold_db,
                trials,
            } => {
                self.telemetry.publish(SessionEvent::ThresholdRecorded {
                    ear,
                    frequency,
                    threshold_db,
                    trials,
                });
                let average_db = self.procedure.grid().average();
                tracing::info!(
                    total_trials = self.procedure.total_trials(),
                    average_db = average_db.unwrap_or_default(),
                    "hearing test complete"
                );
                self.telemetry.publish(SessionEvent::TestCompleted {
                    average_db,
                    total_trials: self.procedure.total_trials(),
                });
            }
        }

        Ok(outcome)
    }

    /// Play the current tone again without changing the search
    pub fn replay(&mut self) -> Result<ToneParameters, HearingTestError> {
        let tone = self
            .procedure
            .current_tone()
            .ok_or(HearingTestError::NoActiveSearch)?;
        self.player.stop();
        Ok(self.present(tone))
    }

    /// Play a tone; playback failures are logged, never fatal to the test
    fn present(&mut self, tone: ToneParameters) -> ToneParameters {
        let tone = ToneParameters {
            duration_ms: self.tone_duration_ms,
            ..tone
        };
        if let Err(err) = self.player.play(&tone) {
            log_audio_error(&err, "HearingTestSession::present");
            self.telemetry.publish(SessionEvent::Error {
                code: err.code(),
                context: err.message(),
            });
        }
        self.telemetry.publish(SessionEvent::TonePresented {
            ear: tone.ear,
            frequency_hz: tone.frequency_hz,
            level_db: tone.level_db,
            gain: tone.gain(),
        });
        tone
    }

    fn publish_search_started(&mut self, tone: &ToneParameters) {
        if let Some(state) = self.procedure.search_state() {
            self.telemetry.publish(SessionEvent::SearchStarted {
                ear: state.ear(),
                frequency: state.frequency(),
                level_db: tone.level_db,
            });
        }
    }

    fn record_error(&mut self, err: &HearingTestError, context: &str) {
        self.telemetry.publish(SessionEvent::Error {
            code: err.code(),
            context: context.to_string(),
        });
    }

    pub fn progress(&self) -> TestProgress {
        self.procedure.progress()
    }

    pub fn is_complete(&self) -> bool {
        self.procedure.is_complete()
    }

    /// Tone currently awaiting a response
    pub fn current_tone(&self) -> Option<ToneParameters> {
        self.procedure.current_tone().map(|tone| ToneParameters {
            duration_ms: self.tone_duration_ms,
            ..tone
        })
    }

    pub fn grid(&self) -> &ThresholdGrid {
        self.procedure.grid()
    }

    pub fn total_trials(&self) -> u32 {
        self.procedure.total_trials()
    }

    /// Build the results report once every cell is recorded
    ///
    /// # Returns
    /// * `Ok(ResultsReport)` - Test complete
    /// * `Err(InsufficientData)` - Cells still missing
    pub fn report(&self) -> Result<ResultsReport, HearingTestError> {
        let grid = self.procedure.grid();
        if !grid.is_complete() {
            return Err(HearingTestError::InsufficientData {
                left_cells: grid.ear_cell_count(Ear::Left),
                right_cells: grid.ear_cell_count(Ear::Right),
            });
        }
        ResultsReport::from_grid(grid)
    }

    /// Live stream of session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.telemetry.subscribe()
    }

    pub fn telemetry_snapshot(&self) -> TelemetrySnapshot {
        self.telemetry.snapshot()
    }

    pub fn player(&self) -> &P {
        &self.player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingPlayer;
    use crate::audiometry::{Frequency, SeverityTier};
    use crate::error::AudioError;

    fn session() -> HearingTestSession<RecordingPlayer> {
        HearingTestSession::new(RecordingPlayer::new(), &AppConfig::default())
    }

    struct FailingPlayer;

    impl TonePlayer for FailingPlayer {
        fn play(&mut self, _tone: &ToneParameters) -> Result<(), AudioError> {
            Err(AudioError::NoOutputDevice)
        }
    }

    #[test]
    fn test_start_plays_first_tone() {
        let mut session = session();
        let tone = session.start().unwrap();
        assert_eq!((tone.ear, tone.frequency_hz, tone.level_db), (Ear::Left, 250, 30));
        assert_eq!(session.player().played(), &[tone]);
    }

    #[test]
    fn test_respond_before_start_is_rejected() {
        let mut session = session();
        assert_eq!(
            session.respond(Response::Heard).unwrap_err(),
            HearingTestError::NoActiveSearch
        );
        assert!(session.player().played().is_empty());
    }

    #[test]
    fn test_each_response_replays_at_new_level() {
        let mut session = session();
        session.start().unwrap();
        session.respond(Response::Heard).unwrap();
        session.respond(Response::NotHeard).unwrap();

        let levels: Vec<i32> = session
            .player()
            .played()
            .iter()
            .map(|tone| tone.level_db)
            .collect();
        assert_eq!(levels, vec![30, 20, 25]);
        assert_eq!(session.player().stop_count(), 2);
    }

    #[test]
    fn test_threshold_moves_to_next_frequency() {
        let mut session = session();
        session.start().unwrap();
        session.respond(Response::NotHeard).unwrap();
        let outcome = session.respond(Response::Heard).unwrap();

        assert!(matches!(
            outcome,
            StepOutcome::ThresholdRecorded {
                threshold_db: 35,
                ..
            }
        ));
        assert_eq!(session.grid().get(Ear::Left, Frequency::Hz250), Some(35));
        let last = session.player().last().unwrap();
        assert_eq!((last.frequency_hz, last.level_db), (500, 30));
    }

    #[test]
    fn test_replay_repeats_current_tone() {
        let mut session = session();
        session.start().unwrap();
        let replayed = session.replay().unwrap();
        assert_eq!(replayed.level_db, 30);
        assert_eq!(session.player().played().len(), 2);
    }

    #[test]
    fn test_playback_failure_is_not_fatal() {
        let mut session = HearingTestSession::new(FailingPlayer, &AppConfig::default());
        session.start().unwrap();
        session.respond(Response::Heard).unwrap();

        let snapshot = session.telemetry_snapshot();
        assert!(snapshot
            .recent
            .iter()
            .any(|event| matches!(event, SessionEvent::Error { code: 1002, .. })));
    }

    #[test]
    fn test_configured_duration_applies_to_tones() {
        let mut config = AppConfig::default();
        config.playback.tone_duration_ms = 800;
        let mut session = HearingTestSession::new(RecordingPlayer::new(), &config);
        let tone = session.start().unwrap();
        assert_eq!(tone.duration_ms, 800);
        assert_eq!(session.current_tone().unwrap().duration_ms, 800);
    }

    #[test]
    fn test_complete_run_reports_and_emits_events() {
        let mut config = AppConfig::default();
        config.telemetry.channel_capacity = 1024;
        let mut session = HearingTestSession::new(RecordingPlayer::new(), &config);
        let mut rx = session.subscribe();
        session.start().unwrap();

        // Always "heard": every cell descends to the -10 dB floor
        let mut outcome = session.respond(Response::Heard).unwrap();
        while !outcome.is_complete() {
            outcome = session.respond(Response::Heard).unwrap();
        }

        assert!(session.is_complete());
        assert_eq!(session.total_trials(), 12 * 5);
        let report = session.report().unwrap();
        assert_eq!(report.average_db, -10);
        assert_eq!(report.interpretation.tier, SeverityTier::Normal);

        let mut thresholds = 0;
        let mut completions = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                SessionEvent::ThresholdRecorded { .. } => thresholds += 1,
                SessionEvent::TestCompleted { .. } => completions += 1,
                _ => {}
            }
        }
        assert_eq!(thresholds, 12);
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_report_before_completion_is_insufficient() {
        let mut session = session();
        session.start().unwrap();
        assert_eq!(
            session.report().unwrap_err(),
            HearingTestError::InsufficientData {
                left_cells: 0,
                right_cells: 0
            }
        );
    }
}
