//! Evaluate Architecture use case
//!
//! Fans the architecture prompt out to several backends and resolves the
//! replies into a [`TechnicalEvaluation`].

use super::fan_out::{FanOutError, ModelFanOut};
use crate::config::EvaluationParams;
use crate::ports::evaluation_logger::{EvaluationEvent, EvaluationLogger, NoEvaluationLog};
use crate::ports::model_invoker::{ModelInvoker, ModelPrompt};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use serde_json::json;
use stagegate_domain::{
    BackendResponse, ConsensusResolver, ContentRecord, EvaluationPrompt, QualityContext,
    TechnicalEvaluation,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluateArchitectureError {
    #[error(transparent)]
    FanOut(#[from] FanOutError),
}

/// Input for the EvaluateArchitecture use case
#[derive(Debug, Clone)]
pub struct EvaluateArchitectureInput {
    /// Project content the backends evaluate
    pub context: ContentRecord,
    pub quality_context: QualityContext,
    pub backends: Vec<String>,
    pub params: EvaluationParams,
}

impl EvaluateArchitectureInput {
    pub fn new(context: ContentRecord, backends: Vec<String>) -> Self {
        Self {
            context,
            quality_context: QualityContext::default(),
            backends,
            params: EvaluationParams::default(),
        }
    }

    pub fn with_quality_context(mut self, quality_context: QualityContext) -> Self {
        self.quality_context = quality_context;
        self
    }

    pub fn with_params(mut self, params: EvaluationParams) -> Self {
        self.params = params;
        self
    }
}

/// Use case for the multi-backend architecture evaluation
pub struct EvaluateArchitectureUseCase<I: ModelInvoker + 'static> {
    fan_out: ModelFanOut<I>,
    resolver: ConsensusResolver,
    logger: Arc<dyn EvaluationLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl<I: ModelInvoker + 'static> EvaluateArchitectureUseCase<I> {
    pub fn new(invoker: Arc<I>) -> Self {
        Self {
            fan_out: ModelFanOut::new(invoker),
            resolver: ConsensusResolver::default(),
            logger: Arc::new(NoEvaluationLog),
            cancellation_token: None,
        }
    }

    pub fn with_resolver(mut self, resolver: ConsensusResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn EvaluationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: EvaluateArchitectureInput,
    ) -> Result<TechnicalEvaluation, EvaluateArchitectureError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: EvaluateArchitectureInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<TechnicalEvaluation, EvaluateArchitectureError> {
        self.run(&input, &input.backends, progress).await
    }

    /// Execute, retrying once with `extra_backend` when the evaluation asks
    /// for escalation, and keep whichever evaluation scored higher.
    pub async fn execute_with_escalation(
        &self,
        input: EvaluateArchitectureInput,
        extra_backend: Option<&str>,
        progress: &dyn ProgressNotifier,
    ) -> Result<TechnicalEvaluation, EvaluateArchitectureError> {
        let first = self.run(&input, &input.backends, progress).await?;

        let Some(extra) = extra_backend else {
            return Ok(first);
        };
        if !first.needs_escalation(input.backends.len())
            || input.backends.iter().any(|b| b == extra)
        {
            return Ok(first);
        }

        info!(
            "Quality score {:.1} with {} backends, escalating with {}",
            first.quality_score,
            input.backends.len(),
            extra
        );
        let mut backends = input.backends.clone();
        backends.push(extra.to_string());
        let escalated = self.run(&input, &backends, progress).await?;

        if escalated.quality_score > first.quality_score {
            info!("Keeping escalated evaluation ({:.1})", escalated.quality_score);
            Ok(escalated)
        } else {
            info!("Keeping original evaluation ({:.1})", first.quality_score);
            Ok(first)
        }
    }

    async fn run(
        &self,
        input: &EvaluateArchitectureInput,
        backends: &[String],
        progress: &dyn ProgressNotifier,
    ) -> Result<TechnicalEvaluation, EvaluateArchitectureError> {
        let prompt = ModelPrompt::new(
            EvaluationPrompt::system(),
            EvaluationPrompt::architecture(&input.context, &input.quality_context),
        );

        let responses = self
            .fan_out
            .evaluate(
                &prompt,
                backends,
                &input.params,
                progress,
                self.cancellation_token.as_ref(),
            )
            .await?;
        for response in &responses {
            self.log_response(response);
        }

        let evaluation = self.resolver.resolve(responses);
        info!(
            "Technical evaluation: quality {:.1}, consensus {}",
            evaluation.quality_score, evaluation.unified.consensus_level
        );
        self.logger.log(EvaluationEvent::new(
            "technical_evaluation",
            json!({
                "backends": backends,
                "quality_score": evaluation.quality_score,
                "consensus_level": evaluation.unified.consensus_level,
                "agreement_score": evaluation.unified.agreement_score,
                "conflict_areas": evaluation.unified.conflict_areas,
                "total_cost": evaluation.unified.total_cost,
            }),
        ));
        Ok(evaluation)
    }

    fn log_response(&self, response: &BackendResponse) {
        self.logger.log(EvaluationEvent::new(
            "backend_response",
            json!({
                "model_id": response.model_id,
                "confidence": response.confidence,
                "cost": response.cost,
                "latency_ms": response.latency_ms,
                "tokens_used": response.tokens_used,
                "error": response.error,
            }),
        ));
    }
}
