// Tone parameters handed to the playback collaborator for each trial

use serde::{Deserialize, Serialize};

use crate::audiometry::levels::{Ear, Frequency};

/// Playback length of every trial tone
pub const TONE_DURATION_MS: u32 = 1500;

const MIN_GAIN: f32 = 0.01;
const MAX_GAIN: f32 = 1.0;

/// Map a ladder level onto an amplitude multiplier
///
/// Linear normalization of [-10, 120] dB into [0.01, 1.0]. This is a
/// monotonic loudness proxy, not a calibrated SPL mapping.
pub fn db_to_gain(level_db: i32) -> f32 {
    let normalized = (level_db as f32 + 10.0) / 130.0;
    normalized.clamp(MIN_GAIN, MAX_GAIN)
}

/// Everything a player needs to render one trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneParameters {
    pub ear: Ear,
    pub frequency_hz: u32,
    pub level_db: i32,
    pub duration_ms: u32,
}

impl ToneParameters {
    pub fn new(ear: Ear, frequency: Frequency, level_db: i32) -> Self {
        Self {
            ear,
            frequency_hz: frequency.hz(),
            level_db,
            duration_ms: TONE_DURATION_MS,
        }
    }

    pub fn gain(&self) -> f32 {
        db_to_gain(self.level_db)
    }

    /// Per-channel gains as (left, right); the opposite ear gets silence
    pub fn channel_gains(&self) -> (f32, f32) {
        let gain = self.gain();
        match self.ear {
            Ear::Left => (gain, 0.0),
            Ear::Right => (0.0, gain),
        }
    }
}
