//! Threshold Adapter
//!
//! Computes the context-sensitive minimum / recommended score for a stage.
//! The three context deltas are combined by **average**, not sum, and the
//! same adjustment is applied to both bounds before clamping.

use super::context::{Complexity, ProjectType, QualityContext, UserExperience};
use crate::core::error::DomainError;
use crate::core::stage::Stage;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const MINIMUM_FLOOR: f64 = 60.0;
pub const MINIMUM_CEILING: f64 = 95.0;
pub const RECOMMENDED_FLOOR: f64 = 70.0;
pub const RECOMMENDED_CEILING: f64 = 98.0;

/// Unadjusted (minimum, recommended) pair for one stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseThreshold {
    pub minimum: f64,
    pub recommended: f64,
}

impl BaseThreshold {
    pub const fn new(minimum: f64, recommended: f64) -> Self {
        Self {
            minimum,
            recommended,
        }
    }
}

/// Injected threshold tables
#[derive(Debug, Clone)]
pub struct ThresholdConfig {
    pub base: BTreeMap<Stage, BaseThreshold>,
    pub fallback: BaseThreshold,
    pub complexity: HashMap<Complexity, i32>,
    pub user_experience: HashMap<UserExperience, i32>,
    pub project_type: HashMap<ProjectType, i32>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            base: BTreeMap::from([
                (Stage::IdeaRefinement, BaseThreshold::new(70.0, 80.0)),
                (Stage::PrdGeneration, BaseThreshold::new(75.0, 85.0)),
                (Stage::UxRequirements, BaseThreshold::new(75.0, 85.0)),
                (Stage::TechnicalAnalysis, BaseThreshold::new(80.0, 90.0)),
                (Stage::ImplementationPlaybook, BaseThreshold::new(80.0, 90.0)),
            ]),
            fallback: BaseThreshold::new(75.0, 85.0),
            complexity: HashMap::from([
                (Complexity::Simple, -10),
                (Complexity::Medium, 0),
                (Complexity::Complex, 5),
                (Complexity::Enterprise, 15),
            ]),
            user_experience: HashMap::from([
                (UserExperience::Novice, -5),
                (UserExperience::Intermediate, 0),
                (UserExperience::Expert, 5),
            ]),
            project_type: HashMap::from([
                (ProjectType::Prototype, -15),
                (ProjectType::Mvp, 0),
                (ProjectType::Production, 10),
            ]),
        }
    }
}

/// Adjusted thresholds for one stage and context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    pub stage: Stage,
    pub minimum: f64,
    pub recommended: f64,
    /// `complexity`, `user_experience`, `project_type` and `total`
    pub adjustments_applied: BTreeMap<String, f64>,
    pub context_factors: QualityContext,
}

/// Computes [`QualityThresholds`] from immutable tables
///
/// # Example
///
/// ```
/// use stagegate_domain::{ProjectType, QualityContext, Stage, ThresholdAdapter};
///
/// let adapter = ThresholdAdapter::default();
/// let ctx = QualityContext::default().with_project_type(ProjectType::Prototype);
/// let t = adapter.get_thresholds(&Stage::PrdGeneration, &ctx);
/// // -15 averaged over three factors
/// assert_eq!(t.minimum, 70.0);
/// assert_eq!(t.adjustments_applied["total"], -5.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ThresholdAdapter {
    config: ThresholdConfig,
}

impl ThresholdAdapter {
    /// Build an adapter, rejecting base pairs outside the clamp ranges
    pub fn try_new(config: ThresholdConfig) -> Result<Self, DomainError> {
        let stages = config
            .base
            .iter()
            .map(|(stage, base)| (stage.to_string(), *base))
            .chain(std::iter::once(("fallback".to_string(), config.fallback)));
        for (stage, base) in stages {
            let reason = if !(MINIMUM_FLOOR..=MINIMUM_CEILING).contains(&base.minimum) {
                Some(format!("minimum {} outside [60, 95]", base.minimum))
            } else if !(RECOMMENDED_FLOOR..=RECOMMENDED_CEILING).contains(&base.recommended) {
                Some(format!("recommended {} outside [70, 98]", base.recommended))
            } else if base.minimum > base.recommended {
                Some("minimum exceeds recommended".to_string())
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(DomainError::InvalidThresholds { stage, reason });
            }
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    pub fn base_for(&self, stage: &Stage) -> BaseThreshold {
        self.config
            .base
            .get(stage)
            .copied()
            .unwrap_or(self.config.fallback)
    }

    pub fn get_thresholds(&self, stage: &Stage, context: &QualityContext) -> QualityThresholds {
        let base = self.base_for(stage);

        let complexity = context
            .complexity
            .and_then(|c| self.config.complexity.get(&c).copied())
            .unwrap_or(0);
        let experience = context
            .user_experience
            .and_then(|e| self.config.user_experience.get(&e).copied())
            .unwrap_or(0);
        let project_type = context
            .project_type
            .and_then(|p| self.config.project_type.get(&p).copied())
            .unwrap_or(0);

        let deltas = [complexity, experience, project_type];
        let total = deltas.iter().sum::<i32>() as f64 / deltas.len() as f64;

        let minimum = (base.minimum + total).clamp(MINIMUM_FLOOR, MINIMUM_CEILING);
        let recommended = (base.recommended + total)
            .clamp(RECOMMENDED_FLOOR, RECOMMENDED_CEILING)
            .max(minimum);

        let adjustments_applied = BTreeMap::from([
            ("complexity".to_string(), complexity as f64),
            ("user_experience".to_string(), experience as f64),
            ("project_type".to_string(), project_type as f64),
            ("total".to_string(), total),
        ]);

        QualityThresholds {
            stage: stage.clone(),
            minimum,
            recommended,
            adjustments_applied,
            context_factors: *context,
        }
    }
}
