//! Remediation templates for low-scoring dimensions

use crate::core::stage::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GENERIC_MINUTES: u32 = 15;

/// Canned advice for one (stage, dimension) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationTemplate {
    pub message: String,
    pub action: String,
    pub estimated_minutes: u32,
}

impl RemediationTemplate {
    pub fn new(message: impl Into<String>, action: impl Into<String>, minutes: u32) -> Self {
        Self {
            message: message.into(),
            action: action.into(),
            estimated_minutes: minutes,
        }
    }

    /// Fallback for pairs without a canned template
    pub fn generic(dimension: &str) -> Self {
        let label = dimension.replace('_', " ");
        Self::new(
            format!("Strengthen {}", label),
            format!("Add concrete detail that improves the {} of this stage", label),
            GENERIC_MINUTES,
        )
    }
}

/// Template table keyed by stage then dimension
#[derive(Debug, Clone)]
pub struct RemediationTemplates {
    templates: BTreeMap<Stage, BTreeMap<String, RemediationTemplate>>,
}

impl RemediationTemplates {
    pub fn new(templates: BTreeMap<Stage, BTreeMap<String, RemediationTemplate>>) -> Self {
        Self { templates }
    }

    pub fn lookup(&self, stage: &Stage, dimension: &str) -> RemediationTemplate {
        self.templates
            .get(stage)
            .and_then(|dims| dims.get(dimension))
            .cloned()
            .unwrap_or_else(|| RemediationTemplate::generic(dimension))
    }
}

fn entries(items: &[(&str, &str, &str, u32)]) -> BTreeMap<String, RemediationTemplate> {
    items
        .iter()
        .map(|(dimension, message, action, minutes)| {
            (
                dimension.to_string(),
                RemediationTemplate::new(*message, *action, *minutes),
            )
        })
        .collect()
}

impl Default for RemediationTemplates {
    fn default() -> Self {
        let templates = BTreeMap::from([
            (
                Stage::IdeaRefinement,
                entries(&[
                    (
                        "problem_clarity",
                        "Problem statement is not specific enough",
                        "Describe who has the problem, when it occurs and why it matters",
                        15,
                    ),
                    (
                        "target_audience",
                        "Target audience is too broad",
                        "Name a concrete segment with role, size or demographic detail",
                        10,
                    ),
                    (
                        "value_proposition",
                        "Value proposition lacks measurable benefit",
                        "State the main benefit with a number and how it differs from alternatives",
                        10,
                    ),
                    (
                        "market_viability",
                        "Market analysis is incomplete",
                        "List competitors and add market size and pricing assumptions",
                        20,
                    ),
                ]),
            ),
            (
                Stage::PrdGeneration,
                entries(&[
                    (
                        "requirements_completeness",
                        "Feature list is thin",
                        "Break the product into at least five described features with success metrics",
                        20,
                    ),
                    (
                        "user_story_quality",
                        "User stories do not follow the standard template",
                        "Rewrite stories as 'As a <role>, I want <goal> so that <benefit>'",
                        15,
                    ),
                    (
                        "acceptance_criteria",
                        "Acceptance criteria are not testable",
                        "Express criteria as Given/When/Then with measurable limits",
                        15,
                    ),
                    (
                        "scope_definition",
                        "Scope boundaries are unclear",
                        "Add an explicit out-of-scope list for this release",
                        10,
                    ),
                ]),
            ),
            (
                Stage::UxRequirements,
                entries(&[
                    (
                        "user_journey_coverage",
                        "User journeys do not cover the main flows",
                        "Map each primary feature to a journey including error paths",
                        20,
                    ),
                    (
                        "accessibility",
                        "Accessibility requirements are missing",
                        "Commit to a WCAG level and cover keyboard and screen reader use",
                        15,
                    ),
                    (
                        "interaction_clarity",
                        "Interaction patterns are vague",
                        "Describe the concrete controls and gestures for each screen",
                        10,
                    ),
                    (
                        "design_consistency",
                        "No shared design system",
                        "Define color, typography and spacing tokens reused across screens",
                        15,
                    ),
                ]),
            ),
            (
                Stage::TechnicalAnalysis,
                entries(&[
                    (
                        "architecture_soundness",
                        "Architecture description is underspecified",
                        "Name the architectural pattern and how it meets scalability and security needs",
                        25,
                    ),
                    (
                        "stack_fit",
                        "Technology stack is incomplete",
                        "Choose a technology for each layer and justify the choice",
                        15,
                    ),
                    (
                        "feasibility",
                        "Feasibility assessment lacks estimates",
                        "Add a timeline in weeks and the team size required",
                        10,
                    ),
                    (
                        "risk_coverage",
                        "Risks are missing mitigations",
                        "Pair each identified risk with a mitigation or fallback",
                        15,
                    ),
                ]),
            ),
            (
                Stage::ImplementationPlaybook,
                entries(&[
                    (
                        "task_breakdown",
                        "Tasks are too coarse",
                        "Split work into tasks small enough to finish in a day or two",
                        20,
                    ),
                    (
                        "sequencing",
                        "Task order and dependencies are unclear",
                        "Group tasks into milestones and note what each depends on",
                        15,
                    ),
                    (
                        "testing_strategy",
                        "Testing strategy is shallow",
                        "Cover unit and integration levels with a coverage target",
                        10,
                    ),
                    (
                        "deployment_readiness",
                        "Deployment plan is missing",
                        "Describe the CI pipeline, staging environment and rollback procedure",
                        5,
                    ),
                ]),
            ),
        ]);
        Self { templates }
    }
}
