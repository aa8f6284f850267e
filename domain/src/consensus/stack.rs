//! Technology stack consensus, decided per category

use super::batch::ResponseBatch;
use super::result::{ConsensusDomain, ConsensusResult, MergedRecommendation, StackRecommendation};
use super::stats::mean;
use std::collections::{BTreeMap, BTreeSet};

pub const CATEGORY_CONFLICT_BELOW: f64 = 0.6;
/// Fitness assumed for a technology no response scored
pub const DEFAULT_STACK_SCORE: f64 = 5.0;

/// Per category, `weighted_score = 0.6 × vote_share + 0.4 × mean_score / 10`.
///
/// The vote share is taken over responses that named the category. The
/// category's agreement is the winner's vote share; the domain agreement is
/// the mean over categories (0 when no response named any).
pub fn resolve(batch: &ResponseBatch<'_>) -> ConsensusResult {
    let categories: BTreeSet<&String> = batch
        .valid()
        .iter()
        .flat_map(|r| r.payload.tech_stack.keys())
        .collect();

    let mut merged = BTreeMap::new();
    let mut conflicts = Vec::new();
    for category in categories {
        let mut by_technology: BTreeMap<&str, Vec<Option<f64>>> = BTreeMap::new();
        for response in batch.valid() {
            if let Some(choice) = response.payload.tech_stack.get(category) {
                by_technology
                    .entry(choice.technology.as_str())
                    .or_default()
                    .push(choice.score);
            }
        }
        let respondents: usize = by_technology.values().map(Vec::len).sum();

        let mut best: Option<StackRecommendation> = None;
        for (technology, scores) in &by_technology {
            let share = scores.len() as f64 / respondents as f64;
            let provided: Vec<f64> = scores.iter().flatten().copied().collect();
            let mean_score = if provided.is_empty() {
                DEFAULT_STACK_SCORE
            } else {
                mean(&provided)
            };
            let weighted_score = 0.6 * share + 0.4 * (mean_score / 10.0);
            if best
                .as_ref()
                .is_none_or(|b| weighted_score > b.weighted_score)
            {
                best = Some(StackRecommendation {
                    technology: technology.to_string(),
                    weighted_score,
                    agreement: share,
                });
            }
        }

        if let Some(best) = best {
            if best.agreement < CATEGORY_CONFLICT_BELOW {
                conflicts.push(format!("stack:{}", category));
            }
            merged.insert(category.clone(), best);
        }
    }

    let agreements: Vec<f64> = merged.values().map(|r| r.agreement).collect();
    let agreement = mean(&agreements);
    let quality_metrics = BTreeMap::from([
        ("categories".to_string(), merged.len() as f64),
        ("conflicted_categories".to_string(), conflicts.len() as f64),
    ]);

    batch.sub_domain_result(
        ConsensusDomain::Stack,
        agreement,
        MergedRecommendation::Stack(merged),
        conflicts,
        "weighted_vote",
        quality_metrics,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::batch::fixtures::reply;
    use serde_json::json;

    fn merged(result: &ConsensusResult) -> &BTreeMap<String, StackRecommendation> {
        match &result.merged_recommendation {
            MergedRecommendation::Stack(m) => m,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_majority_technology_wins() {
        let responses = vec![
            reply("a", json!({"tech_stack": {"backend": {"technology": "rust", "score": 8}}})),
            reply("b", json!({"tech_stack": {"backend": {"technology": "rust", "score": 6}}})),
            reply("c", json!({"tech_stack": {"backend": {"technology": "go", "score": 10}}})),
        ];
        let result = resolve(&ResponseBatch::new(&responses));
        let backend = &merged(&result)["backend"];

        assert_eq!(backend.technology, "rust");
        // 0.6 × 2/3 + 0.4 × 0.7
        assert!((backend.weighted_score - (0.4 + 0.28)).abs() < 1e-9);
        assert!((result.agreement_score - 2.0 / 3.0).abs() < 1e-9);
        assert!(result.conflict_areas.is_empty());
    }

    #[test]
    fn test_split_category_is_conflicted() {
        let responses = vec![
            reply("a", json!({"tech_stack": {"database": "postgres"}})),
            reply("b", json!({"tech_stack": {"database": "mysql"}})),
        ];
        let result = resolve(&ResponseBatch::new(&responses));
        assert_eq!(result.conflict_areas, ["stack:database"]);
        // Equal weighted scores: first in lexicographic order wins
        assert_eq!(merged(&result)["database"].technology, "mysql");
    }

    #[test]
    fn test_no_categories_has_zero_agreement() {
        let responses = vec![reply("a", json!({}))];
        let result = resolve(&ResponseBatch::new(&responses));
        assert_eq!(result.agreement_score, 0.0);
        assert!(merged(&result).is_empty());
    }
}
