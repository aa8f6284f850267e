//! The response set shared by the sub-domain resolvers

use super::level::ConsensusLevel;
use super::response::BackendResponse;
use super::result::{ConsensusDomain, ConsensusResult, MergedRecommendation};
use super::stats::mean;
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Responses of one evaluation, split into valid and failed
///
/// `N` in every agreement formula is the number of valid responses. Failed
/// sentinels only count towards `total_responses` in the metadata.
#[derive(Debug, Clone)]
pub struct ResponseBatch<'a> {
    all: &'a [BackendResponse],
    valid: Vec<&'a BackendResponse>,
}

impl<'a> ResponseBatch<'a> {
    pub fn new(responses: &'a [BackendResponse]) -> Self {
        Self {
            all: responses,
            valid: responses.iter().filter(|r| !r.is_failed()).collect(),
        }
    }

    pub fn all(&self) -> &'a [BackendResponse] {
        self.all
    }

    pub fn valid(&self) -> &[&'a BackendResponse] {
        &self.valid
    }

    pub fn valid_count(&self) -> usize {
        self.valid.len()
    }

    pub fn failed_count(&self) -> usize {
        self.all.len() - self.valid.len()
    }

    /// Cost of the valid responses only
    pub fn total_cost(&self) -> f64 {
        self.valid.iter().map(|r| r.cost).sum()
    }

    pub fn mean_confidence(&self) -> f64 {
        let confidences: Vec<f64> = self.valid.iter().map(|r| r.confidence).collect();
        mean(&confidences)
    }

    /// `0.6 × mean(response confidences) + 0.4 × agreement`
    pub fn sub_domain_confidence(&self, agreement: f64) -> f64 {
        (0.6 * self.mean_confidence() + 0.4 * agreement).clamp(0.0, 1.0)
    }

    pub(crate) fn base_metadata(&self) -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("total_responses".to_string(), json!(self.all.len())),
            ("valid_responses".to_string(), json!(self.valid_count())),
            ("failed_responses".to_string(), json!(self.failed_count())),
        ])
    }

    /// Assemble a sub-domain result with the shared confidence formula
    pub(crate) fn sub_domain_result(
        &self,
        domain: ConsensusDomain,
        agreement: f64,
        merged_recommendation: MergedRecommendation,
        conflict_areas: Vec<String>,
        resolution_strategy: &str,
        quality_metrics: BTreeMap<String, f64>,
    ) -> ConsensusResult {
        let agreement = agreement.clamp(0.0, 1.0);
        ConsensusResult {
            domain,
            consensus_level: ConsensusLevel::from_agreement(agreement),
            agreement_score: agreement,
            merged_recommendation,
            conflict_areas,
            resolution_strategy: resolution_strategy.to_string(),
            confidence: self.sub_domain_confidence(agreement),
            quality_metrics,
            total_cost: self.total_cost(),
            responses: Vec::new(),
            metadata: self.base_metadata(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{failed, reply};
    use super::*;

    #[test]
    fn test_failed_responses_excluded_from_valid_set() {
        let responses = vec![
            reply("a", json!({"confidence": 0.8})),
            failed("b"),
            reply("c", json!({"confidence": 0.6})),
        ];
        let batch = ResponseBatch::new(&responses);
        assert_eq!(batch.valid_count(), 2);
        assert_eq!(batch.failed_count(), 1);
        assert!((batch.total_cost() - 0.02).abs() < 1e-12);
        assert!((batch.mean_confidence() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_sub_domain_confidence_formula() {
        let responses = vec![reply("a", json!({"confidence": 1.0}))];
        let batch = ResponseBatch::new(&responses);
        assert!((batch.sub_domain_confidence(0.5) - 0.8).abs() < 1e-12);
    }
}
