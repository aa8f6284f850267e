//! Cross-Stage Validator
//!
//! Gates stage transitions on prerequisite quality and context, checks
//! semantic consistency between adjacent stages, and prepares the context
//! hand-off. Every outcome is a value; nothing here returns an error.

use super::project::ProjectSnapshot;
use super::result::{ContextHandoff, CrossStageValidationResult, QualityImpact};
use super::rules::ValidationTables;
use super::similarity::jaccard;
use crate::core::error::DomainError;
use crate::core::stage::Stage;
use crate::quality::thresholds::ThresholdAdapter;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const READY_SCORE: f64 = 0.7;
pub const HIGH_QUALITY_PREREQUISITE: f64 = 85.0;
const PREREQUISITE_BONUS: f64 = 0.1;

fn has_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

/// `clamp(1 − min(0.6, 0.2 × errors) − min(0.3, 0.1 × gaps) + bonus, 0, 1)`
fn readiness_score(errors: usize, gaps: usize, bonus: f64) -> f64 {
    let error_penalty = (0.2 * errors as f64).min(0.6);
    let gap_penalty = (0.1 * gaps as f64).min(0.3);
    (1.0 - error_penalty - gap_penalty + bonus).clamp(0.0, 1.0)
}

/// Stateless validator over immutable tables
#[derive(Debug, Clone, Default)]
pub struct CrossStageValidator {
    tables: ValidationTables,
    thresholds: ThresholdAdapter,
}

impl CrossStageValidator {
    pub fn try_new(
        tables: ValidationTables,
        thresholds: ThresholdAdapter,
    ) -> Result<Self, DomainError> {
        tables.validate()?;
        Ok(Self { tables, thresholds })
    }

    pub fn tables(&self) -> &ValidationTables {
        &self.tables
    }

    /// Whether `target` may start, given the stored prerequisite results
    ///
    /// # Example
    ///
    /// ```
    /// use stagegate_domain::{CrossStageValidator, ProjectSnapshot, Stage};
    ///
    /// let validator = CrossStageValidator::default();
    /// let result = validator.check_readiness(&Stage::PrdGeneration, &ProjectSnapshot::new("p"));
    /// assert!(!result.is_consistent);
    /// assert!(!result.errors.is_empty());
    /// ```
    pub fn check_readiness(
        &self,
        target: &Stage,
        project: &ProjectSnapshot,
    ) -> CrossStageValidationResult {
        let mut errors = Vec::new();
        let mut recommendations = Vec::new();
        let mut bonus = 0.0;

        for prerequisite in self.tables.dependencies_for(target) {
            let Some(metrics) = project.quality_metrics(prerequisite) else {
                errors.push(format!(
                    "Prerequisite stage {} has no quality result",
                    prerequisite
                ));
                recommendations.push(format!(
                    "Complete and score {} before starting {}",
                    prerequisite.display_name(),
                    target.display_name()
                ));
                continue;
            };

            let minimum = self
                .thresholds
                .get_thresholds(prerequisite, &project.context)
                .minimum;
            if metrics.overall_score < minimum {
                errors.push(format!(
                    "Prerequisite stage {} scored {:.1}, below its minimum of {:.1}",
                    prerequisite, metrics.overall_score, minimum
                ));
                recommendations.push(format!(
                    "Improve {} to at least {:.0} before starting {}",
                    prerequisite.display_name(),
                    minimum,
                    target.display_name()
                ));
            }
            if metrics.overall_score > HIGH_QUALITY_PREREQUISITE {
                bonus += PREREQUISITE_BONUS;
            }
        }

        let available = project.available_context();
        let context_gaps: Vec<String> = self
            .tables
            .required_keys_for(target)
            .iter()
            .filter(|key| !has_value(available.get(key.as_str())))
            .cloned()
            .collect();

        let consistency_score = readiness_score(errors.len(), context_gaps.len(), bonus);
        CrossStageValidationResult {
            source_stage: None,
            target_stage: target.clone(),
            is_consistent: errors.is_empty() && consistency_score >= READY_SCORE,
            consistency_score,
            quality_impact: QualityImpact::assess(errors.len(), consistency_score),
            errors,
            warnings: Vec::new(),
            context_gaps,
            recommendations,
            rule_scores: BTreeMap::new(),
        }
    }

    /// Word-overlap consistency between two adjacent stages
    pub fn check_consistency(
        &self,
        source: &Stage,
        target: &Stage,
        project: &ProjectSnapshot,
    ) -> CrossStageValidationResult {
        let mut result = CrossStageValidationResult {
            source_stage: Some(source.clone()),
            target_stage: target.clone(),
            is_consistent: true,
            consistency_score: 1.0,
            errors: Vec::new(),
            warnings: Vec::new(),
            context_gaps: Vec::new(),
            recommendations: Vec::new(),
            quality_impact: QualityImpact::Positive,
            rule_scores: BTreeMap::new(),
        };

        let Some(rules) = self.tables.rules_for(source, target) else {
            result.warnings.push(format!(
                "No consistency rules defined for {} -> {}",
                source, target
            ));
            return result;
        };

        let text_of = |stage: &Stage, field: &str| {
            project
                .content(stage)
                .map(|c| c.text_of(field))
                .unwrap_or_default()
        };

        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for rule in rules {
            let source_text = text_of(source, &rule.source_field);
            let target_text = text_of(target, &rule.target_field);
            if source_text.trim().is_empty() || target_text.trim().is_empty() {
                let (stage, field) = if source_text.trim().is_empty() {
                    (source, &rule.source_field)
                } else {
                    (target, &rule.target_field)
                };
                result.warnings.push(format!(
                    "{}: field {} is missing in {}",
                    rule.name, field, stage
                ));
                continue;
            }

            let similarity = jaccard(&source_text, &target_text);
            result.rule_scores.insert(rule.name.clone(), similarity);
            weighted += similarity * rule.weight;
            total_weight += rule.weight;

            if similarity < rule.threshold {
                result.errors.push(format!(
                    "{}: similarity {:.2} is below {:.2}",
                    rule.name, similarity, rule.threshold
                ));
                result.recommendations.push(format!(
                    "Align {} in {} with {} from {}",
                    rule.target_field,
                    target.display_name(),
                    rule.source_field,
                    source.display_name()
                ));
            }
        }

        // Nothing comparable means nothing confirmed
        if total_weight > 0.0 {
            result.consistency_score = (weighted / total_weight).clamp(0.0, 1.0);
        } else {
            result.consistency_score = 0.0;
            result.recommendations.push(format!(
                "Fill in the fields compared between {} and {}",
                source.display_name(),
                target.display_name()
            ));
        }
        result.is_consistent = result.errors.is_empty();
        result.quality_impact =
            QualityImpact::assess(result.errors.len(), result.consistency_score);
        result
    }

    /// Context for `target`, filtered to its required keys
    pub fn prepare_handoff(
        &self,
        source: &Stage,
        target: &Stage,
        project: &ProjectSnapshot,
    ) -> ContextHandoff {
        let available = project.available_context();
        let context_data: Map<String, Value> = self
            .tables
            .required_keys_for(target)
            .iter()
            .filter_map(|key| {
                let value = available.get(key.as_str());
                has_value(value).then(|| (key.clone(), value.cloned().unwrap_or_default()))
            })
            .collect();

        ContextHandoff {
            source_stage: source.clone(),
            target_stage: target.clone(),
            context_data,
            quality_metrics: project.quality_metrics(source).cloned(),
            consistency_score: self.check_consistency(source, target, project).consistency_score,
            timestamp: Utc::now(),
        }
    }
}
