//! Testability harness utilities.
//!
//! `SimulatedListener` answers trial tones from a known set of true
//! thresholds so sessions can run headless in tests and in the CLI
//! `simulate` command. Optional lapses flip answers from a seeded RNG,
//! keeping runs reproducible.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::audio::TonePlayer;
use crate::audiometry::{Ear, Frequency, Response, ToneParameters};
use crate::error::HearingTestError;
use crate::report::ResultsReport;
use crate::session::HearingTestSession;

/// Deterministic listener with per-ear, per-frequency true thresholds
#[derive(Debug, Clone)]
pub struct SimulatedListener {
    default_db: [i32; 2],
    overrides: BTreeMap<(Ear, Frequency), i32>,
    lapse_rate: f64,
    rng: StdRng,
}

impl SimulatedListener {
    /// Same true threshold everywhere
    pub fn uniform(threshold_db: i32) -> Self {
        Self::per_ear(threshold_db, threshold_db)
    }

    pub fn per_ear(left_db: i32, right_db: i32) -> Self {
        Self {
            default_db: [left_db, right_db],
            overrides: BTreeMap::new(),
            lapse_rate: 0.0,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Override one cell's true threshold
    pub fn with_threshold(mut self, ear: Ear, frequency: Frequency, threshold_db: i32) -> Self {
        self.overrides.insert((ear, frequency), threshold_db);
        self
    }

    /// Flip a fraction of answers; `rate` is clamped to [0, 1]
    pub fn with_lapses(mut self, rate: f64, seed: u64) -> Self {
        self.lapse_rate = rate.clamp(0.0, 1.0);
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn true_threshold(&self, ear: Ear, frequency: Frequency) -> i32 {
        self.overrides
            .get(&(ear, frequency))
            .copied()
            .unwrap_or(match ear {
                Ear::Left => self.default_db[0],
                Ear::Right => self.default_db[1],
            })
    }

    /// Heard when the tone is at or above the true threshold, barring a lapse
    pub fn respond(&mut self, tone: &ToneParameters) -> Response {
        let threshold = Frequency::from_hz(tone.frequency_hz)
            .map(|frequency| self.true_threshold(tone.ear, frequency))
            .unwrap_or(i32::MAX);
        let heard = tone.level_db >= threshold;
        let lapse = self.lapse_rate > 0.0 && self.rng.gen_bool(self.lapse_rate);

        match heard != lapse {
            true => Response::Heard,
            false => Response::NotHeard,
        }
    }
}

/// Start `session` and answer every tone with `listener` until complete
pub fn run_session<P: TonePlayer>(
    session: &mut HearingTestSession<P>,
    listener: &mut SimulatedListener,
) -> Result<ResultsReport, HearingTestError> {
    let mut tone = session.start()?;
    loop {
        let outcome = session.respond(listener.respond(&tone))?;
        match outcome.next_tone() {
            Some(next) => tone = next,
            None => break,
        }
    }
    log::info!(
        "[SimulatedListener] Session finished after {} trials",
        session.total_trials()
    );
    session.report()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingPlayer;
    use crate::audiometry::DB_LEVELS;
    use crate::config::AppConfig;

    fn session() -> HearingTestSession<RecordingPlayer> {
        HearingTestSession::new(RecordingPlayer::new(), &AppConfig::default())
    }

    #[test]
    fn test_listener_threshold_rule() {
        let mut listener = SimulatedListener::uniform(25);
        let at = ToneParameters::new(Ear::Left, Frequency::Hz1000, 25);
        let below = ToneParameters::new(Ear::Left, Frequency::Hz1000, 20);
        assert_eq!(listener.respond(&at), Response::Heard);
        assert_eq!(listener.respond(&below), Response::NotHeard);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let listener =
            SimulatedListener::per_ear(10, 40).with_threshold(Ear::Right, Frequency::Hz1500, 70);
        assert_eq!(listener.true_threshold(Ear::Left, Frequency::Hz1500), 10);
        assert_eq!(listener.true_threshold(Ear::Right, Frequency::Hz1500), 70);
        assert_eq!(listener.true_threshold(Ear::Right, Frequency::Hz250), 40);
    }

    #[test]
    fn test_full_lapse_rate_inverts_answers() {
        let mut listener = SimulatedListener::uniform(25).with_lapses(1.0, 7);
        let tone = ToneParameters::new(Ear::Right, Frequency::Hz500, 60);
        assert_eq!(listener.respond(&tone), Response::NotHeard);
    }

    #[test]
    fn test_session_recovers_true_thresholds() {
        let mut listener = SimulatedListener::per_ear(15, 50)
            .with_threshold(Ear::Left, Frequency::Hz8000, 65)
            .with_threshold(Ear::Right, Frequency::Hz250, -10);
        let report = run_session(&mut session(), &mut listener).unwrap();

        for frequency in Frequency::ALL {
            for ear in Ear::ALL {
                assert_eq!(
                    report.results.get(ear, frequency),
                    Some(listener.true_threshold(ear, frequency)),
                    "{ear} {frequency}"
                );
            }
        }
    }

    #[test]
    fn test_lapsing_listener_still_completes() {
        let mut listener = SimulatedListener::uniform(30).with_lapses(0.2, 42);
        let report = run_session(&mut session(), &mut listener).unwrap();
        assert!(report.results.is_complete());
        assert!(report.results.values().all(|db| DB_LEVELS.contains(&db)));
    }

    #[test]
    fn test_seeded_lapses_are_reproducible() {
        let run = |seed| {
            let mut listener = SimulatedListener::uniform(40).with_lapses(0.3, seed);
            run_session(&mut session(), &mut listener).unwrap().results
        };
        assert_eq!(run(9), run(9));
    }
}
