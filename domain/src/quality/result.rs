//! Quality gate results

use super::thresholds::QualityThresholds;
use crate::consensus::level::ConsensusLevel;
use crate::core::stage::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Gate decision for a scored stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStatus {
    Block,
    ProceedWithCaution,
    ProceedExcellent,
}

impl GateStatus {
    /// Pure function of the score and the adjusted thresholds
    ///
    /// # Example
    ///
    /// ```
    /// use stagegate_domain::{GateStatus, QualityContext, Stage, ThresholdAdapter};
    ///
    /// let t = ThresholdAdapter::default()
    ///     .get_thresholds(&Stage::IdeaRefinement, &QualityContext::default());
    /// assert_eq!(GateStatus::decide(80.0, &t), GateStatus::ProceedExcellent);
    /// assert_eq!(GateStatus::decide(70.0, &t), GateStatus::ProceedWithCaution);
    /// assert_eq!(GateStatus::decide(69.9, &t), GateStatus::Block);
    /// ```
    pub fn decide(score: f64, thresholds: &QualityThresholds) -> Self {
        if score >= thresholds.recommended {
            GateStatus::ProceedExcellent
        } else if score >= thresholds.minimum {
            GateStatus::ProceedWithCaution
        } else {
            GateStatus::Block
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, GateStatus::Block)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateStatus::Block => "BLOCK",
            GateStatus::ProceedWithCaution => "PROCEED_WITH_CAUTION",
            GateStatus::ProceedExcellent => "PROCEED_EXCELLENT",
        }
    }
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One remediation step for a weak dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementSuggestion {
    pub dimension: String,
    pub message: String,
    pub action: String,
    pub estimated_minutes: u32,
    /// Expected score gain: `min(20, 85 - score)`
    pub potential_gain: f64,
}

/// Digest of a folded technical evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSummary {
    pub quality_score: f64,
    pub consensus_level: ConsensusLevel,
    pub agreement_score: f64,
    pub conflict_areas: Vec<String>,
}

/// Outcome of scoring one stage's content
///
/// Carries no timestamp or identity: identical inputs produce identical
/// results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityResult {
    pub stage: Stage,
    /// Weighted sum of dimension scores, in [0, 100]
    pub overall_score: f64,
    pub dimension_scores: BTreeMap<String, f64>,
    pub gate_status: GateStatus,
    pub thresholds: QualityThresholds,
    /// At most three, lowest-scoring dimension first
    pub improvement_suggestions: Vec<ImprovementSuggestion>,
    /// In [0, 100]
    pub confidence: f64,
    /// Sum of suggestion minutes, capped at 60
    pub estimated_improvement_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_consistency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_evaluation: Option<TechnicalSummary>,
}

impl QualityResult {
    pub const FAIL_SAFE_SCORE: f64 = 50.0;

    /// Minimal safe result used when scoring hits an internal fault
    pub fn fail_safe(stage: Stage, thresholds: QualityThresholds) -> Self {
        Self {
            stage,
            overall_score: Self::FAIL_SAFE_SCORE,
            dimension_scores: BTreeMap::new(),
            gate_status: GateStatus::Block,
            thresholds,
            improvement_suggestions: Vec::new(),
            confidence: 0.0,
            estimated_improvement_minutes: 0,
            context_consistency: None,
            technical_evaluation: None,
        }
    }

    pub fn with_context_consistency(mut self, score: f64) -> Self {
        self.context_consistency = Some(score.clamp(0.0, 1.0));
        self
    }

    pub fn passed(&self) -> bool {
        !self.gate_status.is_blocked()
    }
}
