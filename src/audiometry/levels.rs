// Test grid axes: ears, frequencies and the candidate level ladder
//
// Levels are addressed by index into DB_LEVELS so stepping is exact integer
// arithmetic. Frequencies and ears are visited in a fixed order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Candidate presentation levels in dB, 5 dB apart
pub const DB_LEVELS: [i32; 27] = [
    -10, -5, 0, 5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75, 80, 85, 90, 95, 100,
    105, 110, 115, 120,
];

/// Index every frequency search starts from (30 dB)
pub const START_LEVEL_INDEX: usize = 8;

/// Highest addressable level index (120 dB)
pub const MAX_LEVEL_INDEX: usize = DB_LEVELS.len() - 1;

/// Ear under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ear {
    Left,
    Right,
}

impl Ear {
    /// Test order: left is completed before right starts
    pub const ALL: [Ear; 2] = [Ear::Left, Ear::Right];

    /// Get the next ear in the test sequence
    ///
    /// # Returns
    /// * `Some(Ear)` - Next ear to test
    /// * `None` - Both ears done
    pub fn next(&self) -> Option<Ear> {
        match self {
            Ear::Left => Some(Ear::Right),
            Ear::Right => None,
        }
    }

    /// The ear that must receive no signal while this one is tested
    pub fn opposite(&self) -> Ear {
        match self {
            Ear::Left => Ear::Right,
            Ear::Right => Ear::Left,
        }
    }

    /// Get human-readable name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            Ear::Left => "Left ear",
            Ear::Right => "Right ear",
        }
    }
}

impl fmt::Display for Ear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ear::Left => write!(f, "left"),
            Ear::Right => write!(f, "right"),
        }
    }
}

/// Pure-tone test frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Frequency {
    Hz250,
    Hz500,
    Hz1000,
    Hz1500,
    Hz2000,
    Hz8000,
}

impl Frequency {
    /// Test order within one ear
    pub const ALL: [Frequency; 6] = [
        Frequency::Hz250,
        Frequency::Hz500,
        Frequency::Hz1000,
        Frequency::Hz1500,
        Frequency::Hz2000,
        Frequency::Hz8000,
    ];

    pub fn hz(&self) -> u32 {
        match self {
            Frequency::Hz250 => 250,
            Frequency::Hz500 => 500,
            Frequency::Hz1000 => 1000,
            Frequency::Hz1500 => 1500,
            Frequency::Hz2000 => 2000,
            Frequency::Hz8000 => 8000,
        }
    }

    /// Look up a test frequency by its value in Hz
    pub fn from_hz(hz: u32) -> Option<Frequency> {
        Self::ALL.iter().copied().find(|f| f.hz() == hz)
    }

    /// Position in the per-ear test order
    pub fn position(&self) -> usize {
        match self {
            Frequency::Hz250 => 0,
            Frequency::Hz500 => 1,
            Frequency::Hz1000 => 2,
            Frequency::Hz1500 => 3,
            Frequency::Hz2000 => 4,
            Frequency::Hz8000 => 5,
        }
    }

    /// Get the next frequency for the same ear, `None` after 8 kHz
    pub fn next(&self) -> Option<Frequency> {
        Self::ALL.get(self.position() + 1).copied()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.hz())
    }
}

impl From<Frequency> for u32 {
    fn from(frequency: Frequency) -> Self {
        frequency.hz()
    }
}

impl TryFrom<u32> for Frequency {
    type Error = String;

    fn try_from(hz: u32) -> Result<Self, Self::Error> {
        Frequency::from_hz(hz).ok_or_else(|| format!("{} Hz is not a test frequency", hz))
    }
}

/// Level in dB at a ladder index, `None` past the ceiling
pub fn level_db(index: usize) -> Option<i32> {
    DB_LEVELS.get(index).copied()
}

/// Ladder index of a dB value, `None` if the value is not on the ladder
pub fn level_index(db: i32) -> Option<usize> {
    DB_LEVELS.iter().position(|&level| level == db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ladder_shape() {
        assert_eq!(DB_LEVELS[0], -10);
        assert_eq!(DB_LEVELS[MAX_LEVEL_INDEX], 120);
        assert_eq!(DB_LEVELS[START_LEVEL_INDEX], 30);
        assert!(DB_LEVELS.windows(2).all(|pair| pair[1] - pair[0] == 5));
    }

    #[test]
    fn test_level_lookup() {
        assert_eq!(level_db(9), Some(35));
        assert_eq!(level_db(MAX_LEVEL_INDEX + 1), None);
        assert_eq!(level_index(-10), Some(0));
        assert_eq!(level_index(120), Some(MAX_LEVEL_INDEX));
        assert_eq!(level_index(12), None);
    }

    #[test]
    fn test_ear_order() {
        assert_eq!(Ear::Left.next(), Some(Ear::Right));
        assert_eq!(Ear::Right.next(), None);
        assert_eq!(Ear::Left.opposite(), Ear::Right);
    }

    #[test]
    fn test_frequency_order() {
        let mut visited = vec![Frequency::Hz250];
        while let Some(next) = visited.last().and_then(|f| f.next()) {
            visited.push(next);
        }
        assert_eq!(visited, Frequency::ALL.to_vec());
    }

    #[test]
    fn test_frequency_hz_lookup() {
        assert_eq!(Frequency::from_hz(1500), Some(Frequency::Hz1500));
        assert_eq!(Frequency::from_hz(4000), None);
        assert!(Frequency::try_from(3000).is_err());
        assert_eq!(u32::from(Frequency::Hz8000), 8000);
    }

    #[test]
    fn test_serde_representation() {
        assert_eq!(serde_json::to_string(&Ear::Left).unwrap(), "\"left\"");
        assert_eq!(serde_json::to_string(&Frequency::Hz2000).unwrap(), "2000");
        let parsed: Frequency = serde_json::from_str("500").unwrap();
        assert_eq!(parsed, Frequency::Hz500);
        assert!(serde_json::from_str::<Frequency>("750").is_err());
    }
}
