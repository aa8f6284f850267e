//! Cross-stage validation
//!
//! - [`CrossStageValidator::check_readiness`]: prerequisite quality and context gaps
//! - [`CrossStageValidator::check_consistency`]: word-overlap rules between adjacent stages
//! - [`CrossStageValidator::prepare_handoff`]: context filtered for the next stage

pub mod project;
pub mod result;
pub mod rules;
pub mod similarity;
pub mod validator;

pub use project::{ProjectSnapshot, QualityMetrics, StageRecord, StageStatus};
pub use result::{ContextHandoff, CrossStageValidationResult, QualityImpact};
pub use rules::{ConsistencyRule, ValidationTables};
pub use validator::CrossStageValidator;
