//! Per-backend evaluation responses

use super::parsing::{EvaluationPayload, interpret_reply};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Token usage reported by a backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// One backend's evaluation, immutable once built
///
/// A failed backend is represented by a sentinel response (see
/// [`BackendResponse::failed`]) instead of an error, so a batch always
/// yields one response per backend.
///
/// # Example
///
/// ```
/// use stagegate_domain::BackendResponse;
/// use std::time::Duration;
///
/// let ok = BackendResponse::from_reply(
///     "model-a",
///     r#"{"architecture": {"pattern": "layered"}, "confidence": 0.9}"#,
///     Duration::from_millis(120),
///     0.02,
///     Default::default(),
/// );
/// assert!(!ok.is_failed());
/// assert_eq!(ok.confidence, 0.9);
///
/// let failed = BackendResponse::failed("model-b", "connection refused", Duration::ZERO);
/// assert!(failed.is_failed());
/// assert_eq!(failed.confidence, 0.0);
/// assert_eq!(failed.cost, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse {
    pub model_id: String,
    /// Reply text, or the error text for a failed backend
    pub raw_content: String,
    /// In [0, 1]; 0 for a failed backend
    pub confidence: f64,
    pub latency_ms: u64,
    pub cost: f64,
    pub tokens_used: u32,
    pub payload: EvaluationPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl BackendResponse {
    /// Build a response from a successful reply, parsing it best-effort
    pub fn from_reply(
        model_id: impl Into<String>,
        raw_content: impl Into<String>,
        latency: Duration,
        cost: f64,
        usage: TokenUsage,
    ) -> Self {
        let raw_content = raw_content.into();
        let (payload, confidence) = interpret_reply(&raw_content);
        Self {
            model_id: model_id.into(),
            raw_content,
            confidence,
            latency_ms: latency.as_millis() as u64,
            cost: if cost.is_finite() { cost.max(0.0) } else { 0.0 },
            tokens_used: usage.total(),
            payload,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Sentinel for a backend whose call failed
    pub fn failed(model_id: impl Into<String>, error: impl ToString, latency: Duration) -> Self {
        let error = error.to_string();
        Self {
            model_id: model_id.into(),
            raw_content: error.clone(),
            confidence: 0.0,
            latency_ms: latency.as_millis() as u64,
            cost: 0.0,
            tokens_used: 0,
            payload: EvaluationPayload::default(),
            error: Some(error),
            timestamp: Utc::now(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparseable_reply_is_valid_with_default_payload() {
        let response = BackendResponse::from_reply(
            "m",
            "I would pick microservices.",
            Duration::from_millis(5),
            0.01,
            TokenUsage::new(10, 20),
        );
        assert!(!response.is_failed());
        assert_eq!(response.confidence, 0.5);
        assert_eq!(response.payload, EvaluationPayload::default());
        assert_eq!(response.tokens_used, 30);
    }

    #[test]
    fn test_failed_sentinel() {
        let response = BackendResponse::failed("m", "timed out", Duration::from_secs(2));
        assert_eq!(response.raw_content, "timed out");
        assert_eq!(response.error.as_deref(), Some("timed out"));
        assert!(response.payload.technical_scores.is_empty());
        assert_eq!(response.latency_ms, 2000);
    }
}
