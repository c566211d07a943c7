//! Session event types streamed to progress UIs and kept in the session
//! history.

use serde::{Deserialize, Serialize};

use crate::audiometry::{Ear, Frequency, Response};

/// Events emitted while a hearing test session runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    SearchStarted {
        ear: Ear,
        frequency: Frequency,
        level_db: i32,
    },
    TonePresented {
        ear: Ear,
        frequency_hz: u32,
        level_db: i32,
        gain: f32,
    },
    ResponseRecorded {
        response: Response,
        level_db: i32,
    },
    ThresholdRecorded {
        ear: Ear,
        frequency: Frequency,
        threshold_db: i32,
        trials: u32,
    },
    TestCompleted {
        average_db: Option<f64>,
        total_trials: u32,
    },
    Error {
        code: i32,
        context: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_is_tagged() {
        let event = SessionEvent::ThresholdRecorded {
            ear: Ear::Right,
            frequency: Frequency::Hz1000,
            threshold_db: 15,
            trials: 4,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "threshold_recorded");
        assert_eq!(json["payload"]["ear"], "right");
        assert_eq!(json["payload"]["frequency"], 1000);
        assert_eq!(json["payload"]["threshold_db"], 15);
    }
}
