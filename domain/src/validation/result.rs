//! Cross-stage validation results and context hand-off

use super::project::QualityMetrics;
use crate::core::stage::Stage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Score at or above which a clean result counts as a positive impact
pub const POSITIVE_IMPACT_SCORE: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityImpact {
    Positive,
    Neutral,
    Negative,
}

impl QualityImpact {
    /// Negative with errors, positive when clean and score ≥ 0.85
    pub fn assess(error_count: usize, score: f64) -> Self {
        if error_count > 0 {
            QualityImpact::Negative
        } else if score >= POSITIVE_IMPACT_SCORE {
            QualityImpact::Positive
        } else {
            QualityImpact::Neutral
        }
    }
}

/// Outcome of a readiness or consistency check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossStageValidationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_stage: Option<Stage>,
    pub target_stage: Stage,
    pub is_consistent: bool,
    /// In [0, 1]
    pub consistency_score: f64,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Required context keys with no value in any stage
    pub context_gaps: Vec<String>,
    pub recommendations: Vec<String>,
    pub quality_impact: QualityImpact,
    /// Similarity per evaluated consistency rule
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rule_scores: BTreeMap<String, f64>,
}

/// Context passed from one stage to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextHandoff {
    pub source_stage: Stage,
    pub target_stage: Stage,
    /// Available context filtered to the target's required keys
    pub context_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_metrics: Option<QualityMetrics>,
    pub consistency_score: f64,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_impact() {
        assert_eq!(QualityImpact::assess(1, 1.0), QualityImpact::Negative);
        assert_eq!(QualityImpact::assess(0, 0.85), QualityImpact::Positive);
        assert_eq!(QualityImpact::assess(0, 0.84), QualityImpact::Neutral);
    }
}
