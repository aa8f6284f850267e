//! Canned-reply model invoker
//!
//! The replay file maps backend ids to what they answer:
//!
//! ```toml
//! [backends.gpt]
//! content = '{"architecture": {"pattern": "modular monolith"}}'
//! cost = 0.012
//! prompt_tokens = 900
//! completion_tokens = 350
//!
//! [backends.flaky]
//! fail = "connection reset by peer"
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use stagegate_application::ports::model_invoker::{
    InvocationReply, InvokerError, ModelInvoker, ModelPrompt,
};
use stagegate_domain::TokenUsage;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Could not read replay file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid replay file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One backend's canned answer
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReplayEntry {
    pub content: String,
    pub cost: f64,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    /// Reported model name; the backend id when absent
    pub model: Option<String>,
    /// When set, the invocation fails with this message
    pub fail: Option<String>,
    /// Simulated latency
    pub delay_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
struct ReplayFile {
    #[serde(default)]
    backends: BTreeMap<String, ReplayEntry>,
}

/// Model invoker answering from a fixed table of replies.
///
/// Holds no mutable state, so concurrent invocations are independent.
#[derive(Debug, Clone, Default)]
pub struct ReplayModelInvoker {
    entries: BTreeMap<String, ReplayEntry>,
}

impl ReplayModelInvoker {
    pub fn new(entries: BTreeMap<String, ReplayEntry>) -> Self {
        Self { entries }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ReplayError> {
        let file: ReplayFile = toml::from_str(text)?;
        Ok(Self::new(file.backends))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Backend ids with a canned reply, sorted
    pub fn backend_ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[async_trait]
impl ModelInvoker for ReplayModelInvoker {
    async fn invoke(
        &self,
        _prompt: &ModelPrompt,
        backend_id: &str,
        _temperature: f64,
        _max_tokens: u32,
    ) -> Result<InvocationReply, InvokerError> {
        let entry = self
            .entries
            .get(backend_id)
            .ok_or_else(|| InvokerError::BackendUnavailable(backend_id.to_string()))?;

        if entry.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(entry.delay_ms)).await;
        }
        if let Some(message) = &entry.fail {
            return Err(InvokerError::RequestFailed(message.clone()));
        }

        debug!("Replaying {} bytes for {}", entry.content.len(), backend_id);
        Ok(InvocationReply {
            content: entry.content.clone(),
            usage: TokenUsage::new(entry.prompt_tokens, entry.completion_tokens),
            cost: entry.cost,
            model: entry
                .model
                .clone()
                .unwrap_or_else(|| backend_id.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLAY: &str = r#"
[backends.gpt]
content = '{"architecture": {"pattern": "layered"}}'
cost = 0.01
prompt_tokens = 900
completion_tokens = 300
model = "gpt-large"

[backends.flaky]
fail = "connection reset"
"#;

    fn prompt() -> ModelPrompt {
        ModelPrompt::new("system", "user")
    }

    #[tokio::test]
    async fn test_replays_configured_backend() {
        let invoker = ReplayModelInvoker::from_toml_str(REPLAY).unwrap();
        let reply = invoker.invoke(&prompt(), "gpt", 0.3, 2000).await.unwrap();
        assert!(reply.content.contains("layered"));
        assert_eq!(reply.cost, 0.01);
        assert_eq!(reply.usage.total(), 1200);
        assert_eq!(reply.model, "gpt-large");
    }

    #[tokio::test]
    async fn test_configured_failure() {
        let invoker = ReplayModelInvoker::from_toml_str(REPLAY).unwrap();
        let result = invoker.invoke(&prompt(), "flaky", 0.3, 2000).await;
        assert_eq!(
            result.unwrap_err(),
            InvokerError::RequestFailed("connection reset".to_string())
        );
    }

    #[tokio::test]
    async fn test_unknown_backend_unavailable() {
        let invoker = ReplayModelInvoker::default();
        let result = invoker.invoke(&prompt(), "nobody", 0.3, 2000).await;
        assert!(matches!(result, Err(InvokerError::BackendUnavailable(_))));
    }

    #[test]
    fn test_backend_ids_sorted() {
        let invoker = ReplayModelInvoker::from_toml_str(REPLAY).unwrap();
        assert_eq!(invoker.backend_ids(), ["flaky", "gpt"]);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replies.toml");
        std::fs::write(&path, REPLAY).unwrap();
        assert!(ReplayModelInvoker::from_path(&path).is_ok());
        assert!(matches!(
            ReplayModelInvoker::from_path(dir.path().join("missing.toml")),
            Err(ReplayError::Io { .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            ReplayModelInvoker::from_toml_str("[backends.gpt\ncontent = 1"),
            Err(ReplayError::Parse(_))
        ));
    }
}
