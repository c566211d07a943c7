// Severity classification of a completed threshold grid
//
// The unweighted mean of all twelve thresholds is mapped onto six ordered
// tiers by inclusive upper bounds. Tier text is a static lookup passed through
// to reporting collaborators untouched.

use serde::{Deserialize, Serialize};

use crate::audiometry::grid::ThresholdGrid;
use crate::audiometry::levels::Ear;
use crate::error::HearingTestError;

/// Ordered hearing-loss severity bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeverityTier {
    Normal,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
    Profound,
}

/// Static text attached to a tier
struct TierProfile {
    label: &'static str,
    description: &'static str,
    device: &'static str,
    color: &'static str,
}

impl SeverityTier {
    pub const ALL: [SeverityTier; 6] = [
        SeverityTier::Normal,
        SeverityTier::Mild,
        SeverityTier::Moderate,
        SeverityTier::ModeratelySevere,
        SeverityTier::Severe,
        SeverityTier::Profound,
    ];

    /// Inclusive upper bound of the tier's average range, `None` for profound
    pub fn upper_bound_db(&self) -> Option<f64> {
        match self {
            SeverityTier::Normal => Some(25.0),
            SeverityTier::Mild => Some(40.0),
            SeverityTier::Moderate => Some(55.0),
            SeverityTier::ModeratelySevere => Some(70.0),
            SeverityTier::Severe => Some(90.0),
            SeverityTier::Profound => None,
        }
    }

    /// Map an average threshold onto its tier
    pub fn from_average_db(avg_db: f64) -> SeverityTier {
        Self::ALL
            .iter()
            .copied()
            .find(|tier| tier.upper_bound_db().is_some_and(|bound| avg_db <= bound))
            .unwrap_or(SeverityTier::Profound)
    }

    fn profile(&self) -> TierProfile {
        match self {
            SeverityTier::Normal => TierProfile {
                label: "Normal hearing",
                description: "Your hearing thresholds are within the normal range. \
                    Soft speech and quiet sounds should be audible without effort.",
                device: "No hearing aid needed; repeat the check once a year",
                color: "#4CAF50",
            },
            SeverityTier::Mild => TierProfile {
                label: "Mild loss",
                description: "Soft sounds and quiet speech may be hard to follow, \
                    especially in noisy places. A visit to an audiologist is recommended.",
                device: "Discreet in-the-canal or receiver-in-canal hearing aid",
                color: "#FFC107",
            },
            SeverityTier::Moderate => TierProfile {
                label: "Moderate loss",
                description: "Normal conversation is often difficult to follow without \
                    amplification. An audiologist consultation is strongly recommended.",
                device: "Receiver-in-canal or behind-the-ear hearing aid",
                color: "#FF9800",
            },
            SeverityTier::ModeratelySevere => TierProfile {
                label: "Moderately-severe loss",
                description: "Most conversational speech is missed without amplification. \
                    Please see an audiologist for a full clinical assessment.",
                device: "Powerful behind-the-ear hearing aid",
                color: "#FF5722",
            },
            SeverityTier::Severe => TierProfile {
                label: "Severe loss",
                description: "Only loud sounds are heard. Clinical diagnostics and a \
                    fitted hearing solution are needed.",
                device: "Super-power behind-the-ear hearing aid",
                color: "#F44336",
            },
            SeverityTier::Profound => TierProfile {
                label: "Profound loss",
                description: "Even very loud sounds may not be heard. Please consult an \
                    ENT specialist about implantable solutions.",
                device: "Ultra-power hearing aid or cochlear implant assessment",
                color: "#D32F2F",
            },
        }
    }

    pub fn label(&self) -> &'static str {
        self.profile().label
    }

    pub fn description(&self) -> &'static str {
        self.profile().description
    }

    /// Recommended device category
    pub fn device_recommendation(&self) -> &'static str {
        self.profile().device
    }

    /// Accent color used by the results screen and PDF
    pub fn display_color(&self) -> &'static str {
        self.profile().color
    }
}

/// Classified result of a complete threshold grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub tier: SeverityTier,
    pub label: String,
    pub description: String,
    pub device_recommendation: String,
    pub color: String,
    /// Unweighted mean over all recorded thresholds
    pub average_db: f64,
}

impl Interpretation {
    fn for_tier(tier: SeverityTier, average_db: f64) -> Self {
        Self {
            tier,
            label: tier.label().to_string(),
            description: tier.description().to_string(),
            device_recommendation: tier.device_recommendation().to_string(),
            color: tier.display_color().to_string(),
            average_db,
        }
    }
}

/// Classify a threshold grid into a severity tier
///
/// Pure function of the grid: repeated calls on the same grid give identical
/// results.
///
/// # Returns
/// * `Ok(Interpretation)` - Both ears have recorded thresholds
/// * `Err(HearingTestError::InsufficientData)` - Either ear is empty
pub fn classify(grid: &ThresholdGrid) -> Result<Interpretation, HearingTestError> {
    let left_cells = grid.ear_cell_count(Ear::Left);
    let right_cells = grid.ear_cell_count(Ear::Right);
    if left_cells == 0 || right_cells == 0 {
        return Err(HearingTestError::InsufficientData {
            left_cells,
            right_cells,
        });
    }

    let average_db = grid.average().ok_or(HearingTestError::InsufficientData {
        left_cells,
        right_cells,
    })?;

    Ok(Interpretation::for_tier(
        SeverityTier::from_average_db(average_db),
        average_db,
    ))
}
