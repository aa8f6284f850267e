//! Per-stage dimension weight tables

use crate::core::error::DomainError;
use crate::core::stage::Stage;
use std::collections::BTreeMap;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// One weighted quality axis
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub weight: f64,
}

impl Dimension {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

fn table(entries: &[(&str, f64)]) -> Vec<Dimension> {
    entries
        .iter()
        .map(|(name, weight)| Dimension::new(*name, *weight))
        .collect()
}

/// Dimension weights per stage, with a generic fallback for custom stages
#[derive(Debug, Clone)]
pub struct DimensionTable {
    stages: BTreeMap<Stage, Vec<Dimension>>,
    generic: Vec<Dimension>,
}

impl Default for DimensionTable {
    fn default() -> Self {
        let stages = BTreeMap::from([
            (
                Stage::IdeaRefinement,
                table(&[
                    ("problem_clarity", 0.30),
                    ("target_audience", 0.25),
                    ("value_proposition", 0.25),
                    ("market_viability", 0.20),
                ]),
            ),
            (
                Stage::PrdGeneration,
                table(&[
                    ("requirements_completeness", 0.30),
                    ("user_story_quality", 0.25),
                    ("acceptance_criteria", 0.25),
                    ("scope_definition", 0.20),
                ]),
            ),
            (
                Stage::UxRequirements,
                table(&[
                    ("user_journey_coverage", 0.30),
                    ("accessibility", 0.25),
                    ("interaction_clarity", 0.25),
                    ("design_consistency", 0.20),
                ]),
            ),
            (
                Stage::TechnicalAnalysis,
                table(&[
                    ("architecture_soundness", 0.30),
                    ("stack_fit", 0.25),
                    ("feasibility", 0.25),
                    ("risk_coverage", 0.20),
                ]),
            ),
            (
                Stage::ImplementationPlaybook,
                table(&[
                    ("task_breakdown", 0.30),
                    ("sequencing", 0.25),
                    ("testing_strategy", 0.25),
                    ("deployment_readiness", 0.20),
                ]),
            ),
        ]);

        Self {
            stages,
            generic: table(&[
                ("completeness", 0.25),
                ("coherence", 0.25),
                ("actionability", 0.25),
                ("specificity", 0.25),
            ]),
        }
    }
}

impl DimensionTable {
    /// Build a table, rejecting any weight set that does not sum to 1.0
    pub fn try_new(
        stages: BTreeMap<Stage, Vec<Dimension>>,
        generic: Vec<Dimension>,
    ) -> Result<Self, DomainError> {
        let candidate = Self { stages, generic };
        candidate.validate()?;
        Ok(candidate)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let all = self
            .stages
            .iter()
            .map(|(stage, dims)| (stage.to_string(), dims))
            .chain(std::iter::once(("generic".to_string(), &self.generic)));
        for (stage, dims) in all {
            let sum: f64 = dims.iter().map(|d| d.weight).sum();
            if dims.is_empty() || (sum - 1.0).abs() > WEIGHT_TOLERANCE {
                return Err(DomainError::InvalidWeights { stage, sum });
            }
        }
        Ok(())
    }

    /// Dimensions for a stage; custom stages get the generic table
    pub fn for_stage(&self, stage: &Stage) -> &[Dimension] {
        self.stages.get(stage).unwrap_or(&self.generic)
    }

    pub fn generic(&self) -> &[Dimension] {
        &self.generic
    }
}
