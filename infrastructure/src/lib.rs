//! Infrastructure layer for stagegate
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod replay;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigSource, ConfigValidationError, FileConfig, FileEvaluationConfig,
    FileOutputConfig, FileOutputFormat,
};
pub use logging::JsonlEvaluationLogger;
pub use replay::{ReplayError, ReplayModelInvoker};
pub use store::JsonFileProjectStore;
