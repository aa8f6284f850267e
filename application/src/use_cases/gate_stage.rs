//! Gate Stage use case
//!
//! Scores one stage of a stored project, records the quality metrics and the
//! resulting stage status, and writes the project back.

use crate::ports::evaluation_logger::{EvaluationEvent, EvaluationLogger, NoEvaluationLog};
use crate::ports::project_store::{ProjectStore, StoreError};
use serde::Serialize;
use serde_json::json;
use stagegate_domain::{
    ContentRecord, CrossStageValidator, QualityGateEngine, QualityMetrics, QualityResult, Stage,
    StageStatus, TechnicalEvaluation,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum GateStageError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Input for the GateStage use case
#[derive(Debug, Clone)]
pub struct GateStageInput {
    pub project_id: String,
    pub stage: Stage,
    /// Replaces the stored content before scoring when present
    pub content: Option<ContentRecord>,
    /// Folded into the `technical_analysis` dimensions when present
    pub evaluation: Option<TechnicalEvaluation>,
}

impl GateStageInput {
    pub fn new(project_id: impl Into<String>, stage: Stage) -> Self {
        Self {
            project_id: project_id.into(),
            stage,
            content: None,
            evaluation: None,
        }
    }

    pub fn with_content(mut self, content: ContentRecord) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_evaluation(mut self, evaluation: TechnicalEvaluation) -> Self {
        self.evaluation = Some(evaluation);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GateStageOutput {
    pub result: QualityResult,
    pub status: StageStatus,
}

/// Use case for gating one stage of a stored project
pub struct GateStageUseCase<S: ProjectStore + 'static> {
    store: Arc<S>,
    engine: QualityGateEngine,
    validator: CrossStageValidator,
    logger: Arc<dyn EvaluationLogger>,
}

impl<S: ProjectStore + 'static> GateStageUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            engine: QualityGateEngine::default(),
            validator: CrossStageValidator::default(),
            logger: Arc::new(NoEvaluationLog),
        }
    }

    pub fn with_engine(mut self, engine: QualityGateEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_validator(mut self, validator: CrossStageValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn EvaluationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub async fn execute(&self, input: GateStageInput) -> Result<GateStageOutput, GateStageError> {
        let mut project = self.store.load(&input.project_id).await?;
        if let Some(content) = input.content {
            project.stage_mut(&input.stage).content = content;
        }

        let content = project
            .content(&input.stage)
            .cloned()
            .unwrap_or_default();
        let mut result = self.engine.score_with_evaluation(
            &input.stage,
            &content,
            &project.context,
            input.evaluation.as_ref(),
        );

        // Consistency with the stored previous stage, when there is one
        if let Some(previous) = input.stage.previous()
            && project.stage(&previous).is_some()
        {
            let check = self
                .validator
                .check_consistency(&previous, &input.stage, &project);
            result = result.with_context_consistency(check.consistency_score);
        }

        let status = StageStatus::from(result.gate_status);
        let record = project.stage_mut(&input.stage);
        record.quality_metrics = Some(QualityMetrics::from(&result));
        record.status = status;
        self.store.save(&project).await?;

        if result.gate_status.is_blocked() {
            warn!(
                "Stage {} blocked: {:.1} < {:.1}",
                input.stage, result.overall_score, result.thresholds.minimum
            );
        } else {
            info!(
                "Stage {} gated {} with {:.1}",
                input.stage, result.gate_status, result.overall_score
            );
        }
        self.logger.log(EvaluationEvent::new(
            "quality_gate",
            json!({
                "project_id": project.id,
                "stage": input.stage,
                "overall_score": result.overall_score,
                "gate_status": result.gate_status,
                "minimum": result.thresholds.minimum,
                "recommended": result.thresholds.recommended,
                "context_consistency": result.context_consistency,
            }),
        ));

        Ok(GateStageOutput { result, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{InMemoryProjectStore, RecordingLogger};
    use stagegate_domain::{GateStatus, ProjectSnapshot, StageRecord};

    fn strong_idea() -> ContentRecord {
        ContentRecord::new(json!({
            "problemStatement": "Small business owners who run home service companies struggle every week with late invoice payments because manual follow-up is slow. The problem is worst in the trades market where owners work on site during the day.",
            "targetAudience": "Owners of small trades businesses with 1-10 employees in North America",
            "valueProposition": "Unlike generic accounting tools, automated reminders reduce late payments by 40% and save 3 hours per week",
            "marketAnalysis": {
                "competitors": ["FreshBooks", "Invoice Ninja"],
                "marketSize": "$4B invoicing software market",
                "trends": ["Mobile-first field service"],
                "pricing": "$15 per month"
            }
        }))
    }

    // ==================== execute ====================

    #[tokio::test]
    async fn test_empty_stage_is_blocked_and_stored() {
        let store = Arc::new(InMemoryProjectStore::with_project(ProjectSnapshot::new("p")));
        let use_case = GateStageUseCase::new(Arc::clone(&store));

        let output = use_case
            .execute(GateStageInput::new("p", Stage::IdeaRefinement))
            .await
            .unwrap();

        assert_eq!(output.result.gate_status, GateStatus::Block);
        assert_eq!(output.status, StageStatus::Blocked);
        let saved = store.get("p").unwrap();
        assert_eq!(
            saved.stage(&Stage::IdeaRefinement).map(|r| r.status),
            Some(StageStatus::Blocked)
        );
        assert_eq!(
            saved.quality_score(&Stage::IdeaRefinement),
            Some(output.result.overall_score)
        );
    }

    #[tokio::test]
    async fn test_supplied_content_is_scored_and_saved() {
        let store = Arc::new(InMemoryProjectStore::with_project(ProjectSnapshot::new("p")));
        let logger = Arc::new(RecordingLogger::default());
        let use_case = GateStageUseCase::new(Arc::clone(&store)).with_logger(logger.clone());

        let output = use_case
            .execute(GateStageInput::new("p", Stage::IdeaRefinement).with_content(strong_idea()))
            .await
            .unwrap();

        assert!(output.result.passed(), "score {}", output.result.overall_score);
        assert_ne!(output.status, StageStatus::Blocked);
        let saved = store.get("p").unwrap();
        assert_eq!(saved.content(&Stage::IdeaRefinement), Some(&strong_idea()));
        assert_eq!(logger.types(), ["quality_gate"]);
    }

    #[tokio::test]
    async fn test_context_consistency_from_previous_stage() {
        let project = ProjectSnapshot::new("p").with_stage(
            Stage::IdeaRefinement,
            StageRecord::with_content(strong_idea()),
        );
        let store = Arc::new(InMemoryProjectStore::with_project(project));
        let use_case = GateStageUseCase::new(Arc::clone(&store));

        let prd = ContentRecord::new(
            json!({"scope": "Automatic reminders for late invoice payments"}),
        );
        let output = use_case
            .execute(GateStageInput::new("p", Stage::PrdGeneration).with_content(prd))
            .await
            .unwrap();
        assert!(output.result.context_consistency.is_some());
    }

    #[tokio::test]
    async fn test_first_stage_has_no_context_consistency() {
        let store = Arc::new(InMemoryProjectStore::with_project(ProjectSnapshot::new("p")));
        let output = GateStageUseCase::new(store)
            .execute(GateStageInput::new("p", Stage::IdeaRefinement).with_content(strong_idea()))
            .await
            .unwrap();
        assert!(output.result.context_consistency.is_none());
    }

    #[tokio::test]
    async fn test_missing_project() {
        let store = Arc::new(InMemoryProjectStore::default());
        let result = GateStageUseCase::new(Arc::clone(&store))
            .execute(GateStageInput::new("ghost", Stage::IdeaRefinement))
            .await;
        assert!(matches!(
            result,
            Err(GateStageError::Store(StoreError::NotFound(_)))
        ));
        assert_eq!(store.save_count(), 0);
    }
}
