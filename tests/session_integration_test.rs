// Integration tests for the hearing test session
//
// Drives full sessions through the public API with simulated listeners and
// checks thresholds, interpretation, telemetry and the results report.

use hearing_check::audio::RecordingPlayer;
use hearing_check::audiometry::{Ear, Frequency, Response, SeverityTier, StepOutcome};
use hearing_check::config::AppConfig;
use hearing_check::telemetry::SessionEvent;
use hearing_check::testing::{run_session, SimulatedListener};
use hearing_check::{HearingTestError, HearingTestSession, ThresholdGrid};

fn new_session() -> HearingTestSession<RecordingPlayer> {
    let mut config = AppConfig::default();
    // Full runs emit a few hundred events; keep subscribers from lagging
    config.telemetry.channel_capacity = 4096;
    HearingTestSession::new(RecordingPlayer::new(), &config)
}

#[test]
fn test_asymmetric_loss_is_recovered_and_classified() {
    let mut session = new_session();
    let mut listener = SimulatedListener::per_ear(20, 70)
        .with_threshold(Ear::Left, Frequency::Hz8000, 45)
        .with_threshold(Ear::Right, Frequency::Hz250, 55);

    let report = run_session(&mut session, &mut listener).unwrap();

    assert_eq!(report.results.get(Ear::Left, Frequency::Hz8000), Some(45));
    assert_eq!(report.results.get(Ear::Right, Frequency::Hz250), Some(55));
    // left: (5 * 20 + 45) / 6 = 24.17, right: (5 * 70 + 55) / 6 = 67.5
    assert_eq!(report.left_ear_avg_db, 24);
    assert_eq!(report.right_ear_avg_db, 68);
    assert_eq!(report.average_db, 46);
    assert_eq!(report.interpretation.tier, SeverityTier::Moderate);
    assert_eq!(report.interpretation.color, "#FF9800");
}

#[test]
fn test_tones_follow_test_order() {
    let mut session = new_session();
    let mut listener = SimulatedListener::uniform(30);
    run_session(&mut session, &mut listener).unwrap();

    let mut cells: Vec<(Ear, u32)> = Vec::new();
    for tone in session.player().played() {
        let cell = (tone.ear, tone.frequency_hz);
        if cells.last() != Some(&cell) {
            cells.push(cell);
        }
    }

    let expected: Vec<(Ear, u32)> = Ear::ALL
        .iter()
        .flat_map(|ear| Frequency::ALL.iter().map(move |f| (*ear, f.hz())))
        .collect();
    assert_eq!(cells, expected);
}

#[test]
fn test_tones_are_lateralized() {
    let mut session = new_session();
    session.start().unwrap();
    let left = session.current_tone().unwrap();
    assert_eq!(left.ear, Ear::Left);
    let (l, r) = left.channel_gains();
    assert!(l > 0.0);
    assert_eq!(r, 0.0);
}

#[test]
fn test_inaudible_cell_caps_at_ceiling() {
    let mut session = new_session();
    let mut listener =
        SimulatedListener::uniform(10).with_threshold(Ear::Right, Frequency::Hz1500, 200);
    let report = run_session(&mut session, &mut listener).unwrap();
    assert_eq!(report.results.get(Ear::Right, Frequency::Hz1500), Some(120));
}

#[test]
fn test_responses_after_completion_are_rejected() {
    let mut session = new_session();
    let mut listener = SimulatedListener::uniform(0);
    run_session(&mut session, &mut listener).unwrap();

    assert!(session.is_complete());
    assert_eq!(session.progress().percentage(), 100);
    assert_eq!(
        session.respond(Response::Heard).unwrap_err(),
        HearingTestError::NoActiveSearch
    );
}

#[test]
fn test_event_stream_matches_session() {
    let mut session = new_session();
    let mut rx = session.subscribe();
    let mut listener = SimulatedListener::per_ear(35, 15);
    let report = run_session(&mut session, &mut listener).unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    let presented = events
        .iter()
        .filter(|event| matches!(event, SessionEvent::TonePresented { .. }))
        .count();
    let responses = events
        .iter()
        .filter(|event| matches!(event, SessionEvent::ResponseRecorded { .. }))
        .count();
    assert_eq!(presented, session.player().played().len());
    assert_eq!(responses as u32, session.total_trials());
    assert!(matches!(
        events.first(),
        Some(SessionEvent::SearchStarted {
            ear: Ear::Left,
            frequency: Frequency::Hz250,
            level_db: 30,
        })
    ));
    match events.last() {
        Some(SessionEvent::TestCompleted { average_db, .. }) => {
            assert_eq!(*average_db, Some(25.0));
            assert_eq!(report.average_db, 25);
        }
        other => panic!("expected TestCompleted last, got {other:?}"),
    }
}

#[test]
fn test_manual_descent_records_first_heard_after_miss() {
    let mut session = new_session();
    session.start().unwrap();

    // 30 heard, 20 heard, 10 missed, 15 heard
    session.respond(Response::Heard).unwrap();
    session.respond(Response::Heard).unwrap();
    session.respond(Response::NotHeard).unwrap();
    let outcome = session.respond(Response::Heard).unwrap();

    match outcome {
        StepOutcome::ThresholdRecorded {
            ear,
            frequency,
            threshold_db,
            trials,
            next,
        } => {
            assert_eq!((ear, frequency), (Ear::Left, Frequency::Hz250));
            assert_eq!(threshold_db, 15);
            assert_eq!(trials, 4);
            assert_eq!((next.frequency_hz, next.level_db), (500, 30));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_report_round_trips_through_grid_json() {
    let mut session = new_session();
    let mut listener = SimulatedListener::per_ear(5, 90);
    let report = run_session(&mut session, &mut listener).unwrap();

    let json = serde_json::to_string(&report.results).unwrap();
    let grid = ThresholdGrid::from_json(&json).unwrap();
    let reclassified = hearing_check::classify(&grid).unwrap();
    assert_eq!(reclassified, report.interpretation);
    assert_eq!(reclassified.tier, SeverityTier::Moderate);
}
