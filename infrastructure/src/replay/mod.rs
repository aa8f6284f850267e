//! Offline model invoker
//!
//! Provides [`ReplayModelInvoker`], which implements the
//! [`ModelInvoker`](stagegate_application::ModelInvoker) port by serving
//! canned replies from a TOML file.

mod replay_invoker;

pub use replay_invoker::{ReplayEntry, ReplayError, ReplayModelInvoker};
