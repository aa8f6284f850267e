//! Consensus Resolver
//!
//! Aggregates per-backend responses into four independent sub-domain results
//! (architecture, stack, feasibility, risk) and one unified result.

use super::batch::ResponseBatch;
use super::level::ConsensusLevel;
use super::response::BackendResponse;
use super::result::{
    ConsensusDomain, ConsensusResult, MergedRecommendation, UnifiedRecommendation,
};
use super::roadmap::{RoadmapItem, build_roadmap};
use super::stats::{dedup_preserving_order, mean};
use super::{architecture, feasibility, risk, stack};
use crate::core::error::DomainError;
use crate::quality::result::TechnicalSummary;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// Technical score assumed when no response reported any
pub const DEFAULT_TECHNICAL_SCORE: f64 = 70.0;
pub const ESCALATION_QUALITY_BELOW: f64 = 85.0;
pub const ESCALATION_MAX_BACKENDS: usize = 4;

/// Weights of the sub-domains in the unified result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainWeights {
    pub architecture: f64,
    pub stack: f64,
    pub feasibility: f64,
    pub risk: f64,
}

impl Default for DomainWeights {
    fn default() -> Self {
        Self {
            architecture: 0.35,
            stack: 0.25,
            feasibility: 0.25,
            risk: 0.15,
        }
    }
}

impl DomainWeights {
    pub fn sum(&self) -> f64 {
        self.architecture + self.stack + self.feasibility + self.risk
    }
}

/// Full outcome of a multi-backend architecture evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalEvaluation {
    pub architecture: ConsensusResult,
    pub stack: ConsensusResult,
    pub feasibility: ConsensusResult,
    pub risk: ConsensusResult,
    pub unified: ConsensusResult,
    pub roadmap: Vec<RoadmapItem>,
    /// In [0, 100]
    pub quality_score: f64,
}

impl TechnicalEvaluation {
    /// Whether a retry with one extra backend is worthwhile.
    ///
    /// The resolver never retries by itself; callers decide.
    pub fn needs_escalation(&self, backends_used: usize) -> bool {
        self.quality_score < ESCALATION_QUALITY_BELOW && backends_used < ESCALATION_MAX_BACKENDS
    }

    /// All responses, failed sentinels included
    pub fn responses(&self) -> &[BackendResponse] {
        &self.unified.responses
    }

    pub fn backends_used(&self) -> usize {
        self.unified.responses.len()
    }

    pub fn sub_domain(&self, domain: ConsensusDomain) -> &ConsensusResult {
        match domain {
            ConsensusDomain::Architecture => &self.architecture,
            ConsensusDomain::Stack => &self.stack,
            ConsensusDomain::Feasibility => &self.feasibility,
            ConsensusDomain::Risk => &self.risk,
            ConsensusDomain::Unified => &self.unified,
        }
    }

    pub fn summary(&self) -> TechnicalSummary {
        TechnicalSummary {
            quality_score: self.quality_score,
            consensus_level: self.unified.consensus_level,
            agreement_score: self.unified.agreement_score,
            conflict_areas: self.unified.conflict_areas.clone(),
        }
    }
}

/// Stateless resolver with injected domain weights
///
/// # Example
///
/// ```
/// use stagegate_domain::{BackendResponse, ConsensusLevel, ConsensusResolver};
/// use std::time::Duration;
///
/// let reply = r#"{"architecture": {"pattern": "microservices"}}"#;
/// let responses: Vec<_> = ["a", "b", "c"]
///     .iter()
///     .map(|id| BackendResponse::from_reply(*id, reply, Duration::ZERO, 0.0, Default::default()))
///     .collect();
///
/// let evaluation = ConsensusResolver::default().resolve(responses);
/// assert_eq!(evaluation.architecture.consensus_level, ConsensusLevel::Strong);
/// assert_eq!(evaluation.architecture.agreement_score, 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConsensusResolver {
    weights: DomainWeights,
}

impl ConsensusResolver {
    pub fn try_new(weights: DomainWeights) -> Result<Self, DomainError> {
        let sum = weights.sum();
        let all_positive = [
            weights.architecture,
            weights.stack,
            weights.feasibility,
            weights.risk,
        ]
        .iter()
        .all(|w| *w >= 0.0);
        if !all_positive || (sum - 1.0).abs() > 1e-9 {
            return Err(DomainError::InvalidWeights {
                stage: "consensus".to_string(),
                sum,
            });
        }
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &DomainWeights {
        &self.weights
    }

    pub fn resolve(&self, responses: Vec<BackendResponse>) -> TechnicalEvaluation {
        let batch = ResponseBatch::new(&responses);

        let architecture = architecture::resolve(&batch);
        let stack = stack::resolve(&batch);
        let feasibility = feasibility::resolve(&batch);
        let risk = risk::resolve(&batch);

        let mut unified = self.unify(&batch, &architecture, &stack, &feasibility, &risk);
        let quality_score = quality_score(&batch, &unified);
        unified
            .quality_metrics
            .insert("quality_score".to_string(), quality_score);

        let roadmap = match &unified.merged_recommendation {
            MergedRecommendation::Unified(merged) => build_roadmap(
                &merged.architecture,
                &merged.feasibility,
                &merged.risks,
                &risk.conflict_areas,
            ),
            _ => Vec::new(),
        };

        unified.responses = responses;

        TechnicalEvaluation {
            architecture,
            stack,
            feasibility,
            risk,
            unified,
            roadmap,
            quality_score,
        }
    }

    fn unify(
        &self,
        batch: &ResponseBatch<'_>,
        architecture: &ConsensusResult,
        stack: &ConsensusResult,
        feasibility: &ConsensusResult,
        risk: &ConsensusResult,
    ) -> ConsensusResult {
        let w = &self.weights;
        let agreement = (w.architecture * architecture.agreement_score
            + w.stack * stack.agreement_score
            + w.feasibility * feasibility.agreement_score
            + w.risk * risk.agreement_score)
            .clamp(0.0, 1.0);

        let subs = [architecture, stack, feasibility, risk];
        let conflict_areas =
            dedup_preserving_order(subs.iter().flat_map(|r| r.conflict_areas.iter().cloned()));
        let confidences: Vec<f64> = subs.iter().map(|r| r.confidence).collect();

        let mut merged = UnifiedRecommendation {
            recommendations: dedup_preserving_order(
                batch
                    .valid()
                    .iter()
                    .flat_map(|r| r.payload.recommendations.items().iter().cloned()),
            ),
            ..Default::default()
        };
        for sub in subs {
            match &sub.merged_recommendation {
                MergedRecommendation::Architecture(a) => merged.architecture = a.clone(),
                MergedRecommendation::Stack(s) => merged.tech_stack = s.clone(),
                MergedRecommendation::Feasibility(f) => merged.feasibility = f.clone(),
                MergedRecommendation::Risk(r) => merged.risks = r.clone(),
                MergedRecommendation::Unified(_) => {}
            }
        }

        let quality_metrics = subs
            .iter()
            .map(|r| (format!("{}_agreement", r.domain), r.agreement_score))
            .collect::<BTreeMap<_, _>>();

        let mut metadata = batch.base_metadata();
        metadata.insert("domain_weights".to_string(), json!(self.weights));

        ConsensusResult {
            domain: ConsensusDomain::Unified,
            consensus_level: ConsensusLevel::from_agreement(agreement),
            agreement_score: agreement,
            merged_recommendation: MergedRecommendation::Unified(Box::new(merged)),
            conflict_areas,
            resolution_strategy: "weighted_domain_merge".to_string(),
            confidence: mean(&confidences).clamp(0.0, 1.0),
            quality_metrics,
            total_cost: batch.total_cost(),
            responses: Vec::new(),
            metadata,
        }
    }
}

/// `clamp(0.4 × agreement × 100 + 0.2 × confidence × 10 + 0.4 × technical_mean, 0, 100)`
fn quality_score(batch: &ResponseBatch<'_>, unified: &ConsensusResult) -> f64 {
    let technical: Vec<f64> = batch
        .valid()
        .iter()
        .flat_map(|r| r.payload.technical_scores.values().copied())
        .collect();
    let technical_mean = if technical.is_empty() {
        DEFAULT_TECHNICAL_SCORE
    } else {
        mean(&technical)
    };
    (0.4 * unified.agreement_score * 100.0 + 0.2 * unified.confidence * 10.0 + 0.4 * technical_mean)
        .clamp(0.0, 100.0)
}
