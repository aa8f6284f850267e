//! Quality Gate Engine
//!
//! Combines the [`DimensionScorer`] and the [`ThresholdAdapter`] into an
//! overall score, a gate decision, suggestions and a confidence figure.
//!
//! [`QualityGateEngine::score`] never fails: an internal fault degrades to
//! [`QualityResult::fail_safe`].

use super::context::QualityContext;
use super::dimensions::{Dimension, DimensionTable};
use super::result::{GateStatus, ImprovementSuggestion, QualityResult};
use super::scorer::DimensionScorer;
use super::suggestions::RemediationTemplates;
use super::thresholds::{QualityThresholds, ThresholdAdapter};
use crate::consensus::result::ConsensusDomain;
use crate::consensus::resolver::TechnicalEvaluation;
use crate::consensus::stats::population_variance;
use crate::content::{ContentRecord, StageContent};
use crate::core::error::DomainError;
use crate::core::stage::Stage;
use std::collections::BTreeMap;

pub const SUGGESTION_BELOW: f64 = 80.0;
pub const MAX_SUGGESTIONS: usize = 3;
pub const SUGGESTION_TARGET: f64 = 85.0;
pub const MAX_GAIN: f64 = 20.0;
pub const MAX_IMPROVEMENT_MINUTES: u32 = 60;

/// Which sub-domain feeds which technical dimension
fn technical_domain(dimension: &str) -> Option<ConsensusDomain> {
    match dimension {
        "architecture_soundness" => Some(ConsensusDomain::Architecture),
        "stack_fit" => Some(ConsensusDomain::Stack),
        "feasibility" => Some(ConsensusDomain::Feasibility),
        "risk_coverage" => Some(ConsensusDomain::Risk),
        _ => None,
    }
}

/// Stateless scoring service over immutable tables
///
/// # Example
///
/// ```
/// use stagegate_domain::{ContentRecord, GateStatus, QualityContext, QualityGateEngine, Stage};
/// use serde_json::json;
///
/// let engine = QualityGateEngine::default();
/// let empty = ContentRecord::new(json!({
///     "problemStatement": "", "targetAudience": "", "valueProposition": "", "marketAnalysis": {}
/// }));
/// let result = engine.score(&Stage::IdeaRefinement, &empty, &QualityContext::default());
/// assert!(result.overall_score < 40.0);
/// assert_eq!(result.gate_status, GateStatus::Block);
/// ```
#[derive(Debug, Clone, Default)]
pub struct QualityGateEngine {
    dimensions: DimensionTable,
    thresholds: ThresholdAdapter,
    templates: RemediationTemplates,
    scorer: DimensionScorer,
}

impl QualityGateEngine {
    /// Build an engine, validating the dimension weights
    pub fn try_new(
        dimensions: DimensionTable,
        thresholds: ThresholdAdapter,
        templates: RemediationTemplates,
    ) -> Result<Self, DomainError> {
        dimensions.validate()?;
        Ok(Self {
            dimensions,
            thresholds,
            templates,
            scorer: DimensionScorer::new(),
        })
    }

    pub fn dimensions(&self) -> &DimensionTable {
        &self.dimensions
    }

    pub fn threshold_adapter(&self) -> &ThresholdAdapter {
        &self.thresholds
    }

    pub fn get_thresholds(&self, stage: &Stage, context: &QualityContext) -> QualityThresholds {
        self.thresholds.get_thresholds(stage, context)
    }

    pub fn score(
        &self,
        stage: &Stage,
        content: &ContentRecord,
        context: &QualityContext,
    ) -> QualityResult {
        self.score_with_evaluation(stage, content, context, None)
    }

    /// Score a stage, folding a technical evaluation into the
    /// `technical_analysis` dimensions when one is supplied.
    pub fn score_with_evaluation(
        &self,
        stage: &Stage,
        content: &ContentRecord,
        context: &QualityContext,
        evaluation: Option<&TechnicalEvaluation>,
    ) -> QualityResult {
        let thresholds = self.thresholds.get_thresholds(stage, context);
        match self.try_score(stage, content, &thresholds, evaluation) {
            Ok(result) => result,
            Err(_) => QualityResult::fail_safe(stage.clone(), thresholds),
        }
    }

    fn try_score(
        &self,
        stage: &Stage,
        content: &ContentRecord,
        thresholds: &QualityThresholds,
        evaluation: Option<&TechnicalEvaluation>,
    ) -> Result<QualityResult, DomainError> {
        let dimensions = self.dimensions.for_stage(stage);
        let parsed = StageContent::parse(stage, content);
        let evaluation = evaluation.filter(|_| *stage == Stage::TechnicalAnalysis);

        let mut dimension_scores = BTreeMap::new();
        for dimension in dimensions {
            let mut score = self.scorer.score(&dimension.name, &parsed, content);
            if let Some(evaluation) = evaluation
                && let Some(domain) = technical_domain(&dimension.name)
            {
                let consensus = evaluation.sub_domain(domain).confidence * 100.0;
                score = (score + consensus) / 2.0;
            }
            if !score.is_finite() {
                return Err(DomainError::NonFiniteScore(dimension.name.clone()));
            }
            dimension_scores.insert(dimension.name.clone(), score.clamp(0.0, 100.0));
        }

        let overall_score = weighted_sum(dimensions, &dimension_scores).clamp(0.0, 100.0);
        let gate_status = GateStatus::decide(overall_score, thresholds);
        let improvement_suggestions = self.suggestions(stage, &dimension_scores);
        let estimated_improvement_minutes = improvement_suggestions
            .iter()
            .map(|s| s.estimated_minutes)
            .sum::<u32>()
            .min(MAX_IMPROVEMENT_MINUTES);
        let confidence = confidence(&dimension_scores, content);

        Ok(QualityResult {
            stage: stage.clone(),
            overall_score,
            dimension_scores,
            gate_status,
            thresholds: thresholds.clone(),
            improvement_suggestions,
            confidence,
            estimated_improvement_minutes,
            context_consistency: None,
            technical_evaluation: evaluation.map(TechnicalEvaluation::summary),
        })
    }

    /// Lowest three dimensions below 80, ascending
    fn suggestions(
        &self,
        stage: &Stage,
        scores: &BTreeMap<String, f64>,
    ) -> Vec<ImprovementSuggestion> {
        let mut weak: Vec<(&String, f64)> = scores
            .iter()
            .filter(|(_, score)| **score < SUGGESTION_BELOW)
            .map(|(name, score)| (name, *score))
            .collect();
        // Stable sort keeps name order among equal scores
        weak.sort_by(|a, b| a.1.total_cmp(&b.1));

        weak.into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(dimension, score)| {
                let template = self.templates.lookup(stage, dimension);
                ImprovementSuggestion {
                    dimension: dimension.clone(),
                    message: template.message,
                    action: template.action,
                    estimated_minutes: template.estimated_minutes,
                    potential_gain: MAX_GAIN.min(SUGGESTION_TARGET - score),
                }
            })
            .collect()
    }
}

fn weighted_sum(dimensions: &[Dimension], scores: &BTreeMap<String, f64>) -> f64 {
    dimensions
        .iter()
        .map(|d| scores.get(&d.name).copied().unwrap_or(0.0) * d.weight)
        .sum()
}

/// `0.7 × (100 − variance) + 0.3 × size_completeness`, clamped to [0, 100]
fn confidence(scores: &BTreeMap<String, f64>, content: &ContentRecord) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let values: Vec<f64> = scores.values().copied().collect();
    let variance = population_variance(&values);
    let size_completeness = (content.serialized_len() as f64 / 10.0).min(100.0);
    (0.7 * (100.0 - variance) + 0.3 * size_completeness).clamp(0.0, 100.0)
}
