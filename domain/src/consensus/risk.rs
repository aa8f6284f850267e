//! Risk consensus: mean severity per category

use super::batch::ResponseBatch;
use super::result::{ConsensusDomain, ConsensusResult, MergedRecommendation, RiskAssessment};
use super::stats::{mean, population_variance};
use std::collections::{BTreeMap, BTreeSet};

pub const RISK_CONFLICT_BELOW: f64 = 0.6;

/// Category agreement is `clamp(1 − variance / 5, 0, 1)`; the domain
/// agreement is the mean over categories (0 when none were reported).
pub fn resolve(batch: &ResponseBatch<'_>) -> ConsensusResult {
    let categories: BTreeSet<&String> = batch
        .valid()
        .iter()
        .flat_map(|r| r.payload.risks.keys())
        .collect();

    let mut merged = BTreeMap::new();
    let mut conflicts = Vec::new();
    for category in categories {
        let severities: Vec<f64> = batch
            .valid()
            .iter()
            .filter_map(|r| r.payload.risks.get(category).copied())
            .collect();
        let agreement = (1.0 - population_variance(&severities) / 5.0).clamp(0.0, 1.0);
        if agreement < RISK_CONFLICT_BELOW {
            conflicts.push(format!("risk:{}", category));
        }
        merged.insert(
            category.clone(),
            RiskAssessment {
                severity: mean(&severities),
                agreement,
            },
        );
    }

    let agreements: Vec<f64> = merged.values().map(|r| r.agreement).collect();
    let max_severity = merged.values().map(|r| r.severity).fold(0.0, f64::max);
    let quality_metrics = BTreeMap::from([
        ("categories".to_string(), merged.len() as f64),
        ("max_severity".to_string(), max_severity),
    ]);

    batch.sub_domain_result(
        ConsensusDomain::Risk,
        mean(&agreements),
        MergedRecommendation::Risk(merged),
        conflicts,
        "severity_mean",
        quality_metrics,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::batch::fixtures::reply;
    use serde_json::json;

    #[test]
    fn test_agreeing_severities() {
        let responses = vec![
            reply("a", json!({"risks": {"security": 3}})),
            reply("b", json!({"risks": {"security": 3}})),
        ];
        let result = resolve(&ResponseBatch::new(&responses));
        assert_eq!(result.agreement_score, 1.0);
        assert!(result.conflict_areas.is_empty());
    }

    #[test]
    fn test_disputed_category_is_conflict() {
        // variance of [1, 5] is 4 → agreement 0.2
        let responses = vec![
            reply("a", json!({"risks": {"security": 1, "cost": 2}})),
            reply("b", json!({"risks": {"security": 5, "cost": 2}})),
        ];
        let result = resolve(&ResponseBatch::new(&responses));
        assert_eq!(result.conflict_areas, ["risk:security"]);
        assert!((result.agreement_score - 0.6).abs() < 1e-9);
        match &result.merged_recommendation {
            MergedRecommendation::Risk(risks) => assert_eq!(risks["security"].severity, 3.0),
            other => panic!("unexpected {:?}", other),
        }
    }
}
