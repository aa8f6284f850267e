//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod evaluation_logger;
pub mod model_invoker;
pub mod progress;
pub mod project_store;
