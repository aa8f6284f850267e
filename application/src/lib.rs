//! Application layer for stagegate
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::EvaluationParams;
pub use ports::{
    evaluation_logger::{EvaluationEvent, EvaluationLogger, NoEvaluationLog},
    model_invoker::{InvocationReply, InvokerError, ModelInvoker, ModelPrompt},
    progress::{NoProgress, ProgressNotifier},
    project_store::{ProjectStore, StoreError},
};
pub use use_cases::advance_stage::{AdvanceStageError, AdvanceStageOutput, AdvanceStageUseCase};
pub use use_cases::evaluate_architecture::{
    EvaluateArchitectureError, EvaluateArchitectureInput, EvaluateArchitectureUseCase,
};
pub use use_cases::fan_out::{FanOutError, ModelFanOut};
pub use use_cases::gate_stage::{GateStageError, GateStageInput, GateStageOutput, GateStageUseCase};
