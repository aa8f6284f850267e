//! Feasibility consensus: mean and population variance of the estimates

use super::batch::ResponseBatch;
use super::parsing::FeasibilityEstimate;
use super::result::{
    ConsensusDomain, ConsensusResult, FeasibilityRecommendation, MergedRecommendation,
};
use super::stats::{mean, population_variance};
use std::collections::BTreeMap;

pub const SCORE_VARIANCE_CONFLICT: f64 = 2.0;
pub const TIMELINE_VARIANCE_CONFLICT: f64 = 16.0;

fn collect(
    batch: &ResponseBatch<'_>,
    field: impl Fn(&FeasibilityEstimate) -> Option<f64>,
) -> Vec<f64> {
    batch
        .valid()
        .iter()
        .filter_map(|r| field(&r.payload.feasibility))
        .collect()
}

fn mean_of(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| mean(values))
}

/// Score agreement is `max(0, 1 − variance / 10)`, timeline agreement
/// `max(0, 1 − variance / 100)`; the domain agreement is the mean of the
/// agreements that have data (0 when neither has).
pub fn resolve(batch: &ResponseBatch<'_>) -> ConsensusResult {
    let scores = collect(batch, |f| f.score);
    let timelines = collect(batch, |f| f.timeline_weeks);
    let team_sizes = collect(batch, |f| f.team_size);

    let score_variance = population_variance(&scores);
    let timeline_variance = population_variance(&timelines);
    let team_variance = population_variance(&team_sizes);

    let mut agreements = Vec::new();
    let mut conflicts = Vec::new();
    let mut quality_metrics = BTreeMap::new();

    if !scores.is_empty() {
        let agreement = (1.0 - score_variance / 10.0).max(0.0);
        agreements.push(agreement);
        quality_metrics.insert("score_agreement".to_string(), agreement);
        if score_variance > SCORE_VARIANCE_CONFLICT {
            conflicts.push("feasibility:score".to_string());
        }
    }
    if !timelines.is_empty() {
        let agreement = (1.0 - timeline_variance / 100.0).max(0.0);
        agreements.push(agreement);
        quality_metrics.insert("timeline_agreement".to_string(), agreement);
        if timeline_variance > TIMELINE_VARIANCE_CONFLICT {
            conflicts.push("feasibility:timeline".to_string());
        }
    }
    quality_metrics.insert("score_variance".to_string(), score_variance);
    quality_metrics.insert("timeline_variance".to_string(), timeline_variance);
    quality_metrics.insert("team_size_variance".to_string(), team_variance);

    let recommendation = FeasibilityRecommendation {
        score: mean_of(&scores),
        timeline_weeks: mean_of(&timelines),
        team_size: mean_of(&team_sizes),
    };

    batch.sub_domain_result(
        ConsensusDomain::Feasibility,
        mean(&agreements),
        MergedRecommendation::Feasibility(recommendation),
        conflicts,
        "statistical_mean",
        quality_metrics,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::batch::fixtures::reply;
    use serde_json::json;

    fn estimate(score: f64, weeks: f64, team: f64) -> serde_json::Value {
        json!({"feasibility": {"score": score, "timeline_weeks": weeks, "team_size": team}})
    }

    #[test]
    fn test_close_estimates_agree() {
        let responses = vec![
            reply("a", estimate(7.0, 12.0, 4.0)),
            reply("b", estimate(7.0, 12.0, 4.0)),
        ];
        let result = resolve(&ResponseBatch::new(&responses));
        assert_eq!(result.agreement_score, 1.0);
        assert!(result.conflict_areas.is_empty());
        match &result.merged_recommendation {
            MergedRecommendation::Feasibility(f) => {
                assert_eq!(f.score, Some(7.0));
                assert_eq!(f.timeline_weeks, Some(12.0));
                assert_eq!(f.team_size, Some(4.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_divergent_estimates_conflict() {
        // score variance 4, timeline variance 36
        let responses = vec![
            reply("a", estimate(3.0, 6.0, 2.0)),
            reply("b", estimate(7.0, 18.0, 6.0)),
        ];
        let result = resolve(&ResponseBatch::new(&responses));
        assert_eq!(
            result.conflict_areas,
            ["feasibility:score", "feasibility:timeline"]
        );
        // mean(1 - 4/10, 1 - 36/100) = mean(0.6, 0.64)
        assert!((result.agreement_score - 0.62).abs() < 1e-9);
    }

    #[test]
    fn test_no_estimates() {
        let responses = vec![reply("a", json!({}))];
        let result = resolve(&ResponseBatch::new(&responses));
        assert_eq!(result.agreement_score, 0.0);
        assert!(result.conflict_areas.is_empty());
    }
}
