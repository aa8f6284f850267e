//! Heuristic quality scoring with adaptive thresholds
//!
//! - [`ThresholdAdapter`]: context-sensitive minimum / recommended scores
//! - [`DimensionScorer`]: per-stage rule-based assessors
//! - [`QualityGateEngine`]: weighted overall score and gate decision

pub mod context;
pub mod dimensions;
pub mod engine;
pub mod result;
pub mod scorer;
pub mod signals;
pub mod suggestions;
pub mod thresholds;

pub use context::{Complexity, ProjectType, QualityContext, UserExperience};
pub use dimensions::{Dimension, DimensionTable};
pub use engine::QualityGateEngine;
pub use result::{GateStatus, ImprovementSuggestion, QualityResult, TechnicalSummary};
pub use scorer::DimensionScorer;
pub use suggestions::{RemediationTemplate, RemediationTemplates};
pub use thresholds::{BaseThreshold, QualityThresholds, ThresholdAdapter, ThresholdConfig};
