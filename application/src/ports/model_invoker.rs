//! Model invoker port
//!
//! Defines the interface for calling one generative-model backend.

use async_trait::async_trait;
use stagegate_domain::TokenUsage;
use thiserror::Error;

/// Errors that can occur while invoking a backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvokerError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// System and user prompt sent to every backend of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPrompt {
    pub system: String,
    pub user: String,
}

impl ModelPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// What a backend returned for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationReply {
    pub content: String,
    pub usage: TokenUsage,
    pub cost: f64,
    /// Model name reported by the backend
    pub model: String,
}

/// Invoker for model backends
///
/// Implementations live in the infrastructure layer. The same invoker is
/// shared by every task of a fan-out, so it must tolerate concurrent calls.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(
        &self,
        prompt: &ModelPrompt,
        backend_id: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<InvocationReply, InvokerError>;
}
