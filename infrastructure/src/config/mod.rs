//! Configuration file loading for stagegate
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables prefixed `STAGEGATE_` (sections split on `__`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./stagegate.toml` or `./.stagegate.toml`
//! 4. Global: `$XDG_CONFIG_HOME/stagegate/config.toml` (or the platform equivalent)
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileEvaluationConfig, FileLoggingConfig, FileOutputConfig,
    FileOutputFormat, FileReplayConfig, FileStoreConfig,
};
pub use loader::{ConfigLoader, ConfigSource};
