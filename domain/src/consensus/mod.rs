//! Multi-backend consensus for architecture evaluation
//!
//! Responses from several backends are parsed into [`EvaluationPayload`]s and
//! aggregated by the [`ConsensusResolver`] into four sub-domain
//! [`ConsensusResult`]s plus a unified one, together forming a
//! [`TechnicalEvaluation`].
//!
//! Failed backends appear as sentinel [`BackendResponse`]s: they count
//! towards response totals but never towards votes, weights or cost.

pub mod architecture;
pub mod batch;
pub mod feasibility;
pub mod level;
pub mod parsing;
pub mod prompt;
pub mod resolver;
pub mod response;
pub mod result;
pub mod risk;
pub mod roadmap;
pub mod stack;
pub mod stats;

pub use batch::ResponseBatch;
pub use level::ConsensusLevel;
pub use parsing::{EvaluationPayload, interpret_reply, parse_evaluation};
pub use prompt::EvaluationPrompt;
pub use resolver::{ConsensusResolver, DomainWeights, TechnicalEvaluation};
pub use response::{BackendResponse, TokenUsage};
pub use result::{
    ArchitectureRecommendation, ConsensusDomain, ConsensusResult, FeasibilityRecommendation,
    MergedRecommendation, RiskAssessment, StackRecommendation, UnifiedRecommendation,
};
pub use roadmap::{RoadmapItem, RoadmapItemKind};
