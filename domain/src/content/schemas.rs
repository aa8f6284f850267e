//! Closed per-stage content schemas
//!
//! Each known stage has one schema. Field names are camelCase on the wire,
//! unknown fields are ignored and a field of the wrong JSON type is read as
//! absent. Parsing a record therefore only fails when the record itself is
//! not an object, which [`StageContent::parse`] reports as
//! [`StageContent::Malformed`].

use super::{ContentRecord, TextList, lenient, lenient_text, lenient_text_map};
use crate::core::stage::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Idea refinement output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdeaContent {
    #[serde(deserialize_with = "lenient_text")]
    pub problem_statement: String,
    #[serde(deserialize_with = "lenient_text")]
    pub target_audience: String,
    #[serde(deserialize_with = "lenient_text")]
    pub value_proposition: String,
    #[serde(deserialize_with = "lenient")]
    pub market_analysis: MarketAnalysis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketAnalysis {
    pub competitors: TextList,
    #[serde(deserialize_with = "lenient_text")]
    pub market_size: String,
    pub trends: TextList,
    #[serde(deserialize_with = "lenient_text")]
    pub pricing: String,
}

impl MarketAnalysis {
    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
            && self.market_size.is_empty()
            && self.trends.is_empty()
            && self.pricing.is_empty()
    }

    pub fn text(&self) -> String {
        [
            self.competitors.joined(),
            self.market_size.clone(),
            self.trends.joined(),
            self.pricing.clone(),
        ]
        .join(" ")
    }
}

/// Product requirements output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrdContent {
    pub features: TextList,
    pub user_stories: TextList,
    pub acceptance_criteria: TextList,
    #[serde(deserialize_with = "lenient_text")]
    pub scope: String,
    pub out_of_scope: TextList,
    pub success_metrics: TextList,
}

/// UX requirements output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UxContent {
    pub user_journeys: TextList,
    pub screens: TextList,
    pub accessibility: TextList,
    pub interaction_patterns: TextList,
    #[serde(deserialize_with = "lenient_text")]
    pub design_system: String,
}

/// Technical analysis output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TechnicalContent {
    #[serde(deserialize_with = "lenient_text")]
    pub architecture: String,
    /// Category → chosen technology
    #[serde(deserialize_with = "lenient_text_map")]
    pub tech_stack: BTreeMap<String, String>,
    #[serde(deserialize_with = "lenient_text")]
    pub feasibility: String,
    pub risks: TextList,
    #[serde(deserialize_with = "lenient_text")]
    pub scalability: String,
}

/// Implementation playbook output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaybookContent {
    pub tasks: TextList,
    pub milestones: TextList,
    #[serde(deserialize_with = "lenient_text")]
    pub testing_strategy: String,
    #[serde(deserialize_with = "lenient_text")]
    pub deployment_plan: String,
    pub dependencies: TextList,
}

/// Parsed content of one stage
#[derive(Debug, Clone, PartialEq)]
pub enum StageContent {
    Idea(IdeaContent),
    Prd(PrdContent),
    Ux(UxContent),
    Technical(TechnicalContent),
    Playbook(PlaybookContent),
    /// Custom stage: no schema, scored by size
    Generic,
    /// The record is not a field → value mapping
    Malformed,
}

impl StageContent {
    /// Parse a record against the schema of `stage`.
    pub fn parse(stage: &Stage, record: &ContentRecord) -> Self {
        if !record.is_record() {
            return StageContent::Malformed;
        }
        let value = record.value().clone();
        let parsed = match stage {
            Stage::IdeaRefinement => serde_json::from_value(value).map(StageContent::Idea),
            Stage::PrdGeneration => serde_json::from_value(value).map(StageContent::Prd),
            Stage::UxRequirements => serde_json::from_value(value).map(StageContent::Ux),
            Stage::TechnicalAnalysis => serde_json::from_value(value).map(StageContent::Technical),
            Stage::ImplementationPlaybook => {
                serde_json::from_value(value).map(StageContent::Playbook)
            }
            Stage::Custom(_) => Ok(StageContent::Generic),
        };
        parsed.unwrap_or(StageContent::Malformed)
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, StageContent::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_idea_ignores_unknown_fields() {
        let record = ContentRecord::new(json!({
            "problemStatement": "Freelancers lose invoices",
            "somethingElse": {"deep": true},
        }));
        match StageContent::parse(&Stage::IdeaRefinement, &record) {
            StageContent::Idea(idea) => {
                assert_eq!(idea.problem_statement, "Freelancers lose invoices");
                assert!(idea.target_audience.is_empty());
                assert!(idea.market_analysis.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_mistyped_field_is_absent() {
        let record = ContentRecord::new(json!({"marketAnalysis": "not a map"}));
        match StageContent::parse(&Stage::IdeaRefinement, &record) {
            StageContent::Idea(idea) => assert!(idea.market_analysis.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_tech_stack_map_flattens_values() {
        let record = ContentRecord::new(json!({
            "techStack": {"backend": "Rust", "database": {"name": "Postgres", "version": 16}}
        }));
        match StageContent::parse(&Stage::TechnicalAnalysis, &record) {
            StageContent::Technical(t) => {
                assert_eq!(t.tech_stack.get("backend").map(String::as_str), Some("Rust"));
                assert!(t.tech_stack["database"].contains("Postgres"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_non_object_is_malformed() {
        let record = ContentRecord::new(json!(["a", "b"]));
        assert!(StageContent::parse(&Stage::PrdGeneration, &record).is_malformed());
    }

    #[test]
    fn test_custom_stage_is_generic() {
        let record = ContentRecord::new(json!({"anything": 1}));
        assert_eq!(
            StageContent::parse(&Stage::Custom("x".into()), &record),
            StageContent::Generic
        );
    }
}
