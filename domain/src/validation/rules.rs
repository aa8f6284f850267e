//! Dependency, required-key and consistency-rule tables

use crate::core::error::DomainError;
use crate::core::stage::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Compare one source field against one target field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyRule {
    pub name: String,
    pub source_field: String,
    pub target_field: String,
    pub weight: f64,
    /// Minimum similarity before the rule reports an error
    pub threshold: f64,
}

impl ConsistencyRule {
    pub fn new(
        name: &str,
        source_field: &str,
        target_field: &str,
        weight: f64,
        threshold: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            source_field: source_field.to_string(),
            target_field: target_field.to_string(),
            weight,
            threshold,
        }
    }
}

/// Injected tables for the cross-stage validator
#[derive(Debug, Clone)]
pub struct ValidationTables {
    pub dependencies: BTreeMap<Stage, Vec<Stage>>,
    pub required_keys: BTreeMap<Stage, Vec<String>>,
    pub rules: BTreeMap<(Stage, Stage), Vec<ConsistencyRule>>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|k| k.to_string()).collect()
}

impl Default for ValidationTables {
    fn default() -> Self {
        use Stage::*;

        let dependencies = BTreeMap::from([
            (IdeaRefinement, vec![]),
            (PrdGeneration, vec![IdeaRefinement]),
            (UxRequirements, vec![IdeaRefinement, PrdGeneration]),
            (TechnicalAnalysis, vec![PrdGeneration, UxRequirements]),
            (
                ImplementationPlaybook,
                vec![PrdGeneration, UxRequirements, TechnicalAnalysis],
            ),
        ]);

        let required_keys = BTreeMap::from([
            (
                PrdGeneration,
                keys(&["problemStatement", "targetAudience", "valueProposition"]),
            ),
            (
                UxRequirements,
                keys(&["targetAudience", "features", "userStories"]),
            ),
            (
                TechnicalAnalysis,
                keys(&["features", "acceptanceCriteria", "userJourneys", "screens"]),
            ),
            (
                ImplementationPlaybook,
                keys(&["features", "architecture", "techStack", "risks", "userJourneys"]),
            ),
        ]);

        let rules = BTreeMap::from([
            (
                (IdeaRefinement, PrdGeneration),
                vec![
                    ConsistencyRule::new(
                        "problem_scope_alignment",
                        "problemStatement",
                        "scope",
                        0.4,
                        0.10,
                    ),
                    ConsistencyRule::new(
                        "audience_story_alignment",
                        "targetAudience",
                        "userStories",
                        0.3,
                        0.05,
                    ),
                    ConsistencyRule::new(
                        "value_feature_alignment",
                        "valueProposition",
                        "features",
                        0.3,
                        0.05,
                    ),
                ],
            ),
            (
                (PrdGeneration, UxRequirements),
                vec![
                    ConsistencyRule::new(
                        "feature_journey_alignment",
                        "features",
                        "userJourneys",
                        0.5,
                        0.05,
                    ),
                    ConsistencyRule::new(
                        "story_screen_alignment",
                        "userStories",
                        "screens",
                        0.3,
                        0.05,
                    ),
                    ConsistencyRule::new(
                        "criteria_interaction_alignment",
                        "acceptanceCriteria",
                        "interactionPatterns",
                        0.2,
                        0.03,
                    ),
                ],
            ),
            (
                (UxRequirements, TechnicalAnalysis),
                vec![
                    ConsistencyRule::new(
                        "journey_architecture_alignment",
                        "userJourneys",
                        "architecture",
                        0.6,
                        0.03,
                    ),
                    ConsistencyRule::new(
                        "accessibility_stack_alignment",
                        "accessibility",
                        "techStack",
                        0.4,
                        0.02,
                    ),
                ],
            ),
            (
                (TechnicalAnalysis, ImplementationPlaybook),
                vec![
                    ConsistencyRule::new(
                        "architecture_task_alignment",
                        "architecture",
                        "tasks",
                        0.4,
                        0.05,
                    ),
                    ConsistencyRule::new(
                        "stack_deployment_alignment",
                        "techStack",
                        "deploymentPlan",
                        0.3,
                        0.03,
                    ),
                    ConsistencyRule::new(
                        "risk_testing_alignment",
                        "risks",
                        "testingStrategy",
                        0.3,
                        0.03,
                    ),
                ],
            ),
        ]);

        Self {
            dependencies,
            required_keys,
            rules,
        }
    }
}

impl ValidationTables {
    /// Reject rule sets whose weights do not sum to 1.0
    pub fn validate(&self) -> Result<(), DomainError> {
        for ((source, target), rules) in &self.rules {
            let sum: f64 = rules.iter().map(|r| r.weight).sum();
            if rules.is_empty() || (sum - 1.0).abs() > 1e-9 {
                return Err(DomainError::InvalidWeights {
                    stage: format!("{} -> {}", source, target),
                    sum,
                });
            }
        }
        Ok(())
    }

    pub fn dependencies_for(&self, target: &Stage) -> &[Stage] {
        self.dependencies.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn required_keys_for(&self, target: &Stage) -> &[String] {
        self.required_keys.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rules_for(&self, source: &Stage, target: &Stage) -> Option<&[ConsistencyRule]> {
        self.rules
            .get(&(source.clone(), target.clone()))
            .map(Vec::as_slice)
    }

    /// Latest prerequisite in pipeline order
    pub fn nearest_prerequisite(&self, target: &Stage) -> Option<&Stage> {
        self.dependencies_for(target).iter().max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_valid() {
        assert!(ValidationTables::default().validate().is_ok());
    }

    #[test]
    fn test_dependencies_precede_target() {
        let tables = ValidationTables::default();
        for stage in Stage::pipeline() {
            for dep in tables.dependencies_for(&stage) {
                assert!(dep < &stage, "{} depends on later {}", stage, dep);
            }
        }
    }

    #[test]
    fn test_nearest_prerequisite() {
        let tables = ValidationTables::default();
        assert_eq!(
            tables.nearest_prerequisite(&Stage::ImplementationPlaybook),
            Some(&Stage::TechnicalAnalysis)
        );
        assert_eq!(tables.nearest_prerequisite(&Stage::IdeaRefinement), None);
        assert_eq!(tables.nearest_prerequisite(&Stage::Custom("x".into())), None);
    }

    #[test]
    fn test_unknown_pair_has_no_rules() {
        let tables = ValidationTables::default();
        assert!(
            tables
                .rules_for(&Stage::IdeaRefinement, &Stage::TechnicalAnalysis)
                .is_none()
        );
    }
}
