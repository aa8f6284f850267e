//! Model invocation fan-out
//!
//! Sends one prompt to several backends concurrently and gathers one
//! [`BackendResponse`] per backend. A failing, erroring or timed-out backend
//! becomes a sentinel response; the batch itself only fails when there is
//! nothing to invoke or when it is cancelled.

use crate::config::EvaluationParams;
use crate::ports::model_invoker::{InvocationReply, InvokerError, ModelInvoker, ModelPrompt};
use crate::ports::progress::ProgressNotifier;
use stagegate_domain::BackendResponse;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The only ways a whole batch fails
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FanOutError {
    #[error("No backends configured")]
    NoBackends,

    #[error("Operation cancelled")]
    Cancelled,
}

impl FanOutError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FanOutError::Cancelled)
    }
}

/// Concurrent fan-out over a shared invoker
pub struct ModelFanOut<I: ModelInvoker + 'static> {
    invoker: Arc<I>,
}

impl<I: ModelInvoker + 'static> Clone for ModelFanOut<I> {
    fn clone(&self) -> Self {
        Self {
            invoker: Arc::clone(&self.invoker),
        }
    }
}

impl<I: ModelInvoker + 'static> ModelFanOut<I> {
    pub fn new(invoker: Arc<I>) -> Self {
        Self { invoker }
    }

    /// Invoke every backend and return their responses in request order.
    ///
    /// All tasks are joined before returning. When `cancellation` fires
    /// first, the remaining tasks are aborted and the partial results are
    /// discarded.
    pub async fn evaluate(
        &self,
        prompt: &ModelPrompt,
        backend_ids: &[String],
        params: &EvaluationParams,
        progress: &dyn ProgressNotifier,
        cancellation: Option<&CancellationToken>,
    ) -> Result<Vec<BackendResponse>, FanOutError> {
        if backend_ids.is_empty() {
            return Err(FanOutError::NoBackends);
        }
        if cancellation.is_some_and(|token| token.is_cancelled()) {
            return Err(FanOutError::Cancelled);
        }

        info!("Fanning out to {} backends", backend_ids.len());
        progress.on_fan_out_start(backend_ids.len());

        let mut join_set = JoinSet::new();
        for (index, backend_id) in backend_ids.iter().enumerate() {
            let invoker = Arc::clone(&self.invoker);
            let backend_id = backend_id.clone();
            let prompt = prompt.clone();
            let params = params.clone();

            join_set.spawn(async move {
                let started = Instant::now();
                let outcome =
                    Self::invoke_one(invoker.as_ref(), &prompt, &backend_id, &params).await;
                (index, backend_id, outcome, started.elapsed())
            });
        }

        let mut slots: Vec<Option<BackendResponse>> = vec![None; backend_ids.len()];
        loop {
            let joined = match cancellation {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        warn!("Fan-out cancelled, discarding partial results");
                        join_set.abort_all();
                        return Err(FanOutError::Cancelled);
                    }
                    joined = join_set.join_next() => joined,
                },
                None => join_set.join_next().await,
            };
            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok((index, backend_id, outcome, latency)) => {
                    let response = Self::to_response(&backend_id, outcome, latency);
                    progress.on_backend_complete(&backend_id, !response.is_failed());
                    slots[index] = Some(response);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        progress.on_fan_out_complete();

        // A task that panicked never filled its slot
        let responses: Vec<BackendResponse> = slots
            .into_iter()
            .zip(backend_ids)
            .map(|(slot, backend_id)| {
                slot.unwrap_or_else(|| {
                    BackendResponse::failed(
                        backend_id.as_str(),
                        "task did not complete",
                        Duration::ZERO,
                    )
                })
            })
            .collect();

        let failed = responses.iter().filter(|r| r.is_failed()).count();
        info!(
            "Fan-out complete: {} succeeded, {} failed",
            responses.len() - failed,
            failed
        );
        Ok(responses)
    }

    async fn invoke_one(
        invoker: &I,
        prompt: &ModelPrompt,
        backend_id: &str,
        params: &EvaluationParams,
    ) -> Result<InvocationReply, InvokerError> {
        let call = invoker.invoke(prompt, backend_id, params.temperature, params.max_tokens);
        match params.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| InvokerError::Timeout)?,
            None => call.await,
        }
    }

    fn to_response(
        backend_id: &str,
        outcome: Result<InvocationReply, InvokerError>,
        latency: Duration,
    ) -> BackendResponse {
        match outcome {
            Ok(reply) => {
                debug!("Backend {} ({}) responded", backend_id, reply.model);
                BackendResponse::from_reply(
                    backend_id,
                    &reply.content,
                    latency,
                    reply.cost,
                    reply.usage,
                )
            }
            Err(e) => {
                warn!("Backend {} failed: {}", backend_id, e);
                BackendResponse::failed(backend_id, e, latency)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::use_cases::test_support::{Script, ScriptedInvoker, backends};
    use std::sync::Mutex;

    const REPLY: &str = r#"{"architecture": {"pattern": "microservices"}, "confidence": 0.8}"#;

    fn prompt() -> ModelPrompt {
        ModelPrompt::new("system", "evaluate")
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ProgressNotifier for RecordingProgress {
        fn on_fan_out_start(&self, total_backends: usize) {
            self.events.lock().unwrap().push(format!("start:{}", total_backends));
        }
        fn on_backend_complete(&self, backend_id: &str, success: bool) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:{}", backend_id, success));
        }
        fn on_fan_out_complete(&self) {
            self.events.lock().unwrap().push("complete".to_string());
        }
    }

    // ==================== Partial failure ====================

    #[tokio::test]
    async fn test_one_failing_backend_yields_sentinel() {
        let invoker = ScriptedInvoker::new()
            .with("a", Script::reply(REPLY, 0.01))
            .with("b", Script::Fail("connection refused".to_string()))
            .with("c", Script::reply(REPLY, 0.02));
        let fan_out = ModelFanOut::new(Arc::new(invoker));

        let responses = fan_out
            .evaluate(
                &prompt(),
                &backends(&["a", "b", "c"]),
                &EvaluationParams::default(),
                &NoProgress,
                None,
            )
            .await
            .unwrap();

        assert_eq!(responses.len(), 3);
        let ids: Vec<_> = responses.iter().map(|r| r.model_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(responses[1].is_failed());
        assert_eq!(responses[1].confidence, 0.0);
        assert_eq!(responses[1].cost, 0.0);
        assert!(responses[1].raw_content.contains("connection refused"));
        assert_eq!(responses[0].confidence, 0.8);
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_not_failed() {
        let invoker = ScriptedInvoker::new().with("a", Script::reply("no json here", 0.01));
        let fan_out = ModelFanOut::new(Arc::new(invoker));
        let responses = fan_out
            .evaluate(
                &prompt(),
                &backends(&["a"]),
                &EvaluationParams::default(),
                &NoProgress,
                None,
            )
            .await
            .unwrap();
        assert!(!responses[0].is_failed());
        assert_eq!(responses[0].confidence, 0.5);
    }

    #[tokio::test]
    async fn test_timeout_becomes_sentinel() {
        let invoker = ScriptedInvoker::new()
            .with("fast", Script::reply(REPLY, 0.0))
            .with("slow", Script::Hang);
        let fan_out = ModelFanOut::new(Arc::new(invoker));
        let params = EvaluationParams::default().with_timeout(Some(Duration::from_millis(50)));

        let responses = fan_out
            .evaluate(&prompt(), &backends(&["fast", "slow"]), &params, &NoProgress, None)
            .await
            .unwrap();

        assert!(!responses[0].is_failed());
        assert!(responses[1].is_failed());
        assert!(responses[1].error.as_deref().unwrap_or_default().contains("Timeout"));
    }

    #[tokio::test]
    async fn test_backends_run_concurrently() {
        let slow = |content: &str| Script::Delayed {
            delay: Duration::from_millis(200),
            content: content.to_string(),
        };
        let invoker = ScriptedInvoker::new()
            .with("a", slow(REPLY))
            .with("b", slow(REPLY));
        let fan_out = ModelFanOut::new(Arc::new(invoker));

        let started = Instant::now();
        let responses = fan_out
            .evaluate(
                &prompt(),
                &backends(&["a", "b"]),
                &EvaluationParams::default(),
                &NoProgress,
                None,
            )
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert!(responses.iter().all(|r| !r.is_failed()));
        // Sequential calls would need at least 400ms
        assert!(elapsed < Duration::from_millis(350), "took {:?}", elapsed);
    }

    // ==================== Batch failures ====================

    #[tokio::test]
    async fn test_no_backends() {
        let fan_out = ModelFanOut::new(Arc::new(ScriptedInvoker::new()));
        let result = fan_out
            .evaluate(&prompt(), &[], &EvaluationParams::default(), &NoProgress, None)
            .await;
        assert_eq!(result, Err(FanOutError::NoBackends));
    }

    #[tokio::test]
    async fn test_cancelled_batch_discards_results() {
        let invoker = ScriptedInvoker::new()
            .with("a", Script::reply(REPLY, 0.0))
            .with("b", Script::Hang);
        let fan_out = ModelFanOut::new(Arc::new(invoker));
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = fan_out
            .evaluate(
                &prompt(),
                &backends(&["a", "b"]),
                &EvaluationParams::default(),
                &NoProgress,
                Some(&token),
            )
            .await;
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_already_cancelled_token() {
        let fan_out = ModelFanOut::new(Arc::new(ScriptedInvoker::new()));
        let token = CancellationToken::new();
        token.cancel();
        let result = fan_out
            .evaluate(
                &prompt(),
                &backends(&["a"]),
                &EvaluationParams::default(),
                &NoProgress,
                Some(&token),
            )
            .await;
        assert_eq!(result, Err(FanOutError::Cancelled));
    }

    // ==================== Progress ====================

    #[tokio::test]
    async fn test_progress_events() {
        let invoker = ScriptedInvoker::new()
            .with("a", Script::reply(REPLY, 0.0))
            .with("b", Script::Fail("down".to_string()));
        let fan_out = ModelFanOut::new(Arc::new(invoker));
        let progress = RecordingProgress::default();

        fan_out
            .evaluate(
                &prompt(),
                &backends(&["a", "b"]),
                &EvaluationParams::default(),
                &progress,
                None,
            )
            .await
            .unwrap();

        let events = progress.events.lock().unwrap().clone();
        assert_eq!(events.first().map(String::as_str), Some("start:2"));
        assert_eq!(events.last().map(String::as_str), Some("complete"));
        assert!(events.contains(&"a:true".to_string()));
        assert!(events.contains(&"b:false".to_string()));
    }
}
