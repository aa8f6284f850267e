//! Discrete consensus levels

use serde::{Deserialize, Serialize};
use std::fmt;

pub const STRONG_CUT: f64 = 0.8;
pub const MODERATE_CUT: f64 = 0.6;
pub const WEAK_CUT: f64 = 0.4;

/// How strongly backends agree on a recommendation
///
/// # Example
///
/// ```
/// use stagegate_domain::ConsensusLevel;
///
/// assert_eq!(ConsensusLevel::from_agreement(0.85), ConsensusLevel::Strong);
/// assert_eq!(ConsensusLevel::from_agreement(0.45), ConsensusLevel::Weak);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsensusLevel {
    NoConsensus,
    Weak,
    Moderate,
    Strong,
}

impl ConsensusLevel {
    /// Map an agreement score onto the fixed cut points 0.8 / 0.6 / 0.4
    pub fn from_agreement(agreement: f64) -> Self {
        if agreement >= STRONG_CUT {
            ConsensusLevel::Strong
        } else if agreement >= MODERATE_CUT {
            ConsensusLevel::Moderate
        } else if agreement >= WEAK_CUT {
            ConsensusLevel::Weak
        } else {
            ConsensusLevel::NoConsensus
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsensusLevel::NoConsensus => "NO_CONSENSUS",
            ConsensusLevel::Weak => "WEAK",
            ConsensusLevel::Moderate => "MODERATE",
            ConsensusLevel::Strong => "STRONG",
        }
    }
}

impl fmt::Display for ConsensusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_points() {
        assert_eq!(ConsensusLevel::from_agreement(0.85), ConsensusLevel::Strong);
        assert_eq!(ConsensusLevel::from_agreement(0.65), ConsensusLevel::Moderate);
        assert_eq!(ConsensusLevel::from_agreement(0.45), ConsensusLevel::Weak);
        assert_eq!(ConsensusLevel::from_agreement(0.2), ConsensusLevel::NoConsensus);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        assert_eq!(ConsensusLevel::from_agreement(0.8), ConsensusLevel::Strong);
        assert_eq!(ConsensusLevel::from_agreement(0.6), ConsensusLevel::Moderate);
        assert_eq!(ConsensusLevel::from_agreement(0.4), ConsensusLevel::Weak);
        assert_eq!(ConsensusLevel::from_agreement(0.0), ConsensusLevel::NoConsensus);
    }

    #[test]
    fn test_serializes_screaming_case() {
        let json = serde_json::to_string(&ConsensusLevel::NoConsensus).unwrap();
        assert_eq!(json, r#""NO_CONSENSUS""#);
    }
}
