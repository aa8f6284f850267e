//! Advance Stage use case
//!
//! Moves a project to its next stage: checks readiness, and when the target
//! is ready hands the prerequisite context over and marks it in progress.

use crate::ports::evaluation_logger::{EvaluationEvent, EvaluationLogger, NoEvaluationLog};
use crate::ports::project_store::{ProjectStore, StoreError};
use serde::Serialize;
use serde_json::json;
use stagegate_domain::{
    ContextHandoff, CrossStageValidationResult, CrossStageValidator, Stage, StageStatus,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum AdvanceStageError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvanceStageOutput {
    pub readiness: CrossStageValidationResult,
    /// Stored on the target record; `None` when blocked or for the first stage
    pub handoff: Option<ContextHandoff>,
}

impl AdvanceStageOutput {
    pub fn advanced(&self) -> bool {
        self.readiness.is_consistent
    }
}

/// Use case for advancing a stored project to a target stage
pub struct AdvanceStageUseCase<S: ProjectStore + 'static> {
    store: Arc<S>,
    validator: CrossStageValidator,
    logger: Arc<dyn EvaluationLogger>,
}

impl<S: ProjectStore + 'static> AdvanceStageUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            validator: CrossStageValidator::default(),
            logger: Arc::new(NoEvaluationLog),
        }
    }

    pub fn with_validator(mut self, validator: CrossStageValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn EvaluationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub async fn execute(
        &self,
        project_id: &str,
        target: &Stage,
    ) -> Result<AdvanceStageOutput, AdvanceStageError> {
        let mut project = self.store.load(project_id).await?;

        let readiness = self.validator.check_readiness(target, &project);
        self.logger.log(EvaluationEvent::new(
            "stage_readiness",
            json!({
                "project_id": project.id,
                "target_stage": target,
                "is_consistent": readiness.is_consistent,
                "consistency_score": readiness.consistency_score,
                "errors": readiness.errors,
                "context_gaps": readiness.context_gaps,
            }),
        ));

        if !readiness.is_consistent {
            warn!(
                "Project {} not ready for {}: {} error(s)",
                project.id,
                target,
                readiness.errors.len()
            );
            return Ok(AdvanceStageOutput {
                readiness,
                handoff: None,
            });
        }

        let handoff = self
            .validator
            .tables()
            .nearest_prerequisite(target)
            .map(|source| self.validator.prepare_handoff(source, target, &project));

        let record = project.stage_mut(target);
        record.input_context = handoff.clone();
        record.status = StageStatus::InProgress;
        self.store.save(&project).await?;

        if let Some(handoff) = &handoff {
            info!(
                "Handed {} context key(s) from {} to {}",
                handoff.context_data.len(),
                handoff.source_stage,
                target
            );
            self.logger.log(EvaluationEvent::new(
                "context_handoff",
                json!({
                    "project_id": project.id,
                    "source_stage": handoff.source_stage,
                    "target_stage": handoff.target_stage,
                    "keys": handoff.context_data.keys().collect::<Vec<_>>(),
                    "consistency_score": handoff.consistency_score,
                }),
            ));
        }

        Ok(AdvanceStageOutput { readiness, handoff })
    }
}
