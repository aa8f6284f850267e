//! Evaluation parameters for fan-out calls
//!
//! [`EvaluationParams`] groups the per-call settings passed to every backend
//! of a fan-out. These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-backend invocation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationParams {
    /// Sampling temperature passed to each backend.
    pub temperature: f64,
    /// Completion token limit passed to each backend.
    pub max_tokens: u32,
    /// Per-backend time limit; expiry turns that backend into a failed response.
    pub timeout: Option<Duration>,
}

impl Default for EvaluationParams {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 2000,
            timeout: None,
        }
    }
}

impl EvaluationParams {
    // ==================== Builder Methods ====================

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Timeout from an optional number of seconds
    pub fn with_timeout_seconds(self, seconds: Option<u64>) -> Self {
        self.with_timeout(seconds.map(Duration::from_secs))
    }
}
