//! Architecture pattern consensus: majority vote over named patterns

use super::batch::ResponseBatch;
use super::result::{
    ArchitectureRecommendation, ConsensusDomain, ConsensusResult, MergedRecommendation,
};
use serde_json::json;
use std::collections::BTreeMap;

pub const PATTERN_TIE_CONFLICT: &str = "architecture:pattern_tie";

/// `agreement = max_votes / N`.
///
/// Ties are broken by taking the lexicographically smallest pattern and are
/// reported as a conflict. Alternates are tallied separately and never add
/// to a pattern's votes.
pub fn resolve(batch: &ResponseBatch<'_>) -> ConsensusResult {
    let mut votes: BTreeMap<String, usize> = BTreeMap::new();
    let mut alternatives: BTreeMap<String, usize> = BTreeMap::new();
    for response in batch.valid() {
        if let Some(pattern) = response.payload.pattern() {
            *votes.entry(pattern).or_default() += 1;
        }
        for alt in response.payload.alternatives() {
            *alternatives.entry(alt).or_default() += 1;
        }
    }

    let max_votes = votes.values().copied().max().unwrap_or(0);
    // BTreeMap order makes the first leader the lexicographic winner
    let leaders: Vec<String> = votes
        .iter()
        .filter(|(_, count)| max_votes > 0 && **count == max_votes)
        .map(|(pattern, _)| pattern.clone())
        .collect();

    let agreement = match batch.valid_count() {
        0 => 0.0,
        n => max_votes as f64 / n as f64,
    };

    let mut conflicts = Vec::new();
    if leaders.len() > 1 {
        conflicts.push(PATTERN_TIE_CONFLICT.to_string());
    }

    let quality_metrics = BTreeMap::from([
        ("max_votes".to_string(), max_votes as f64),
        ("distinct_patterns".to_string(), votes.len() as f64),
    ]);

    let recommendation = ArchitectureRecommendation {
        pattern: leaders.first().cloned(),
        votes,
        alternatives,
    };

    let mut result = batch.sub_domain_result(
        ConsensusDomain::Architecture,
        agreement,
        MergedRecommendation::Architecture(recommendation),
        conflicts,
        "majority_vote",
        quality_metrics,
    );
    if leaders.len() > 1 {
        result
            .metadata
            .insert("tied_patterns".to_string(), json!(leaders));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::batch::fixtures::{failed, reply};
    use crate::consensus::level::ConsensusLevel;
    use crate::consensus::response::BackendResponse;

    fn pattern_reply(model: &str, pattern: &str) -> BackendResponse {
        reply(model, json!({"architecture": {"pattern": pattern}}))
    }

    fn recommendation(result: &ConsensusResult) -> &ArchitectureRecommendation {
        match &result.merged_recommendation {
            MergedRecommendation::Architecture(r) => r,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unanimous_is_strong() {
        let responses = vec![
            pattern_reply("a", "microservices"),
            pattern_reply("b", "Microservices"),
            pattern_reply("c", "microservices "),
        ];
        let result = resolve(&ResponseBatch::new(&responses));
        assert_eq!(result.consensus_level, ConsensusLevel::Strong);
        assert_eq!(result.agreement_score, 1.0);
        assert_eq!(recommendation(&result).pattern.as_deref(), Some("microservices"));
        assert!(result.conflict_areas.is_empty());
    }

    #[test]
    fn test_tie_breaks_lexicographically() {
        let responses = vec![
            pattern_reply("a", "serverless"),
            pattern_reply("b", "layered"),
        ];
        let result = resolve(&ResponseBatch::new(&responses));
        assert_eq!(recommendation(&result).pattern.as_deref(), Some("layered"));
        assert_eq!(result.conflict_areas, [PATTERN_TIE_CONFLICT]);
        assert_eq!(result.agreement_score, 0.5);

        // Response order does not matter
        let reversed: Vec<_> = responses.into_iter().rev().collect();
        let again = resolve(&ResponseBatch::new(&reversed));
        assert_eq!(recommendation(&again).pattern.as_deref(), Some("layered"));
    }

    #[test]
    fn test_failed_backend_not_counted() {
        let responses = vec![
            pattern_reply("a", "mvc"),
            pattern_reply("b", "mvc"),
            failed("c"),
        ];
        let result = resolve(&ResponseBatch::new(&responses));
        assert_eq!(result.agreement_score, 1.0);
        assert_eq!(result.metadata["total_responses"], json!(3));
        assert_eq!(result.metadata["failed_responses"], json!(1));
    }

    #[test]
    fn test_alternatives_tallied_separately() {
        let responses = vec![
            reply(
                "a",
                json!({"architecture": {"pattern": "layered", "alternatives": ["hexagonal"]}}),
            ),
            pattern_reply("b", "hexagonal"),
        ];
        let result = resolve(&ResponseBatch::new(&responses));
        let rec = recommendation(&result);
        assert_eq!(rec.votes["hexagonal"], 1);
        assert_eq!(rec.alternatives["hexagonal"], 1);
    }

    #[test]
    fn test_no_valid_responses() {
        let responses = vec![failed("a")];
        let result = resolve(&ResponseBatch::new(&responses));
        assert_eq!(result.agreement_score, 0.0);
        assert_eq!(result.consensus_level, ConsensusLevel::NoConsensus);
        assert_eq!(recommendation(&result).pattern, None);
    }
}
