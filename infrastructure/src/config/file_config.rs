//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.

use serde::{Deserialize, Serialize};
use stagegate_application::EvaluationParams;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("backend id cannot be empty")]
    EmptyBackendId,

    #[error("temperature {0} is outside [0, 2]")]
    InvalidTemperature(f64),
}

/// Raw evaluation configuration from TOML (`[evaluation]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEvaluationConfig {
    /// Backend ids queried for every architecture evaluation
    pub backends: Vec<String>,
    /// Extra backend used when an evaluation asks for escalation
    pub escalation_backend: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Per-backend timeout in seconds
    pub timeout_seconds: Option<u64>,
}

impl Default for FileEvaluationConfig {
    fn default() -> Self {
        Self {
            backends: Vec::new(),
            escalation_backend: None,
            temperature: 0.3,
            max_tokens: 2000,
            timeout_seconds: Some(120),
        }
    }
}

/// Raw project store configuration from TOML (`[store]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    /// Directory holding one `<project-id>.json` document per project
    pub directory: PathBuf,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("projects"),
        }
    }
}

/// Raw replay configuration from TOML (`[replay]` section)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplayConfig {
    /// Canned backend replies used by the replay invoker
    pub path: Option<PathBuf>,
}

/// Raw logging configuration from TOML (`[logging]` section)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving evaluation events
    pub evaluation_log: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOutputFormat {
    Text,
    Json,
}

/// Raw output configuration from TOML (`[output]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub format: Option<FileOutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub evaluation: FileEvaluationConfig,
    pub store: FileStoreConfig,
    pub replay: FileReplayConfig,
    pub logging: FileLoggingConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Some(0) = self.evaluation.timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        let ids = self
            .evaluation
            .backends
            .iter()
            .chain(self.evaluation.escalation_backend.iter());
        for id in ids {
            if id.trim().is_empty() {
                return Err(ConfigValidationError::EmptyBackendId);
            }
        }

        let temperature = self.evaluation.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigValidationError::InvalidTemperature(temperature));
        }

        Ok(())
    }

    /// Per-backend invocation parameters for the application layer
    pub fn evaluation_params(&self) -> EvaluationParams {
        EvaluationParams::default()
            .with_temperature(self.evaluation.temperature)
            .with_max_tokens(self.evaluation.max_tokens)
            .with_timeout_seconds(self.evaluation.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[evaluation]
backends = ["gpt", "claude", "gemini"]
escalation_backend = "mistral"
temperature = 0.5
max_tokens = 1500
timeout_seconds = 60

[store]
directory = "/var/lib/stagegate"

[replay]
path = "replies.toml"

[logging]
evaluation_log = "logs/evaluations.jsonl"

[output]
format = "json"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.evaluation.backends.len(), 3);
        assert_eq!(config.evaluation.escalation_backend.as_deref(), Some("mistral"));
        assert_eq!(config.store.directory, PathBuf::from("/var/lib/stagegate"));
        assert_eq!(config.replay.path, Some(PathBuf::from("replies.toml")));
        assert_eq!(
            config.logging.evaluation_log,
            Some(PathBuf::from("logs/evaluations.jsonl"))
        );
        assert_eq!(config.output.format, Some(FileOutputFormat::Json));
        assert!(!config.output.color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[evaluation]
backends = ["gpt"]
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.evaluation.backends, ["gpt"]);
        // Defaults should apply
        assert_eq!(config.evaluation.temperature, 0.3);
        assert_eq!(config.evaluation.timeout_seconds, Some(120));
        assert_eq!(config.store.directory, PathBuf::from("projects"));
        assert!(config.output.color);
    }

    #[test]
    fn test_evaluation_params() {
        let mut config = FileConfig::default();
        config.evaluation.max_tokens = 800;
        config.evaluation.timeout_seconds = None;
        let params = config.evaluation_params();
        assert_eq!(params.max_tokens, 800);
        assert_eq!(params.temperature, 0.3);
        assert!(params.timeout.is_none());

        config.evaluation.timeout_seconds = Some(5);
        assert_eq!(config.evaluation_params().timeout, Some(Duration::from_secs(5)));
    }

    // ==================== Validation ====================

    #[test]
    fn test_validate_default_config() {
        assert!(FileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = FileConfig::default();
        config.evaluation.timeout_seconds = Some(0);
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidTimeout));
    }

    #[test]
    fn test_validate_empty_backend() {
        let mut config = FileConfig::default();
        config.evaluation.backends = vec!["gpt".to_string(), "  ".to_string()];
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyBackendId));

        let mut config = FileConfig::default();
        config.evaluation.escalation_backend = Some(String::new());
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyBackendId));
    }

    #[test]
    fn test_validate_temperature() {
        let mut config = FileConfig::default();
        config.evaluation.temperature = 2.5;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidTemperature(2.5))
        );
    }
}
