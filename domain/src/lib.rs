//! Domain layer for stagegate
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Quality Gate
//!
//! Every pipeline stage (idea → PRD → UX → technical analysis → playbook)
//! produces a content record. The [`QualityGateEngine`] scores it across
//! weighted dimensions and compares the result against thresholds the
//! [`ThresholdAdapter`] adjusts for the project's context.
//!
//! ## Consensus
//!
//! Technical analysis is evaluated by several model backends at once. The
//! [`ConsensusResolver`] merges their answers per sub-domain (architecture,
//! stack, feasibility, risk) into a [`TechnicalEvaluation`].
//!
//! ## Cross-Stage Validation
//!
//! The [`CrossStageValidator`] checks that a stage's prerequisites passed,
//! that adjacent stages agree with each other, and prepares the context
//! handed to the next stage.

pub mod consensus;
pub mod content;
pub mod core;
pub mod quality;
pub mod validation;

// Re-export commonly used types
pub use consensus::{
    BackendResponse, ConsensusDomain, ConsensusLevel, ConsensusResolver, ConsensusResult,
    DomainWeights, EvaluationPayload, EvaluationPrompt, MergedRecommendation, RoadmapItem,
    RoadmapItemKind, TechnicalEvaluation, TokenUsage, interpret_reply, parse_evaluation,
};
pub use content::{ContentRecord, StageContent};
pub use core::{error::DomainError, stage::Stage};
pub use quality::{
    Complexity, DimensionTable, GateStatus, ImprovementSuggestion, ProjectType, QualityContext,
    QualityGateEngine, QualityResult, QualityThresholds, RemediationTemplates, ThresholdAdapter,
    ThresholdConfig, UserExperience,
};
pub use validation::{
    ContextHandoff, CrossStageValidationResult, CrossStageValidator, ProjectSnapshot,
    QualityImpact, QualityMetrics, StageRecord, StageStatus, ValidationTables,
};
