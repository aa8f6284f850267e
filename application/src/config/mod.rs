//! Application-level configuration.
//!
//! - [`EvaluationParams`]: per-backend temperature, token limit and timeout

pub mod evaluation_params;

pub use evaluation_params::EvaluationParams;
