//! Consensus result types

use super::level::ConsensusLevel;
use super::response::BackendResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sub-domain a consensus result covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusDomain {
    Architecture,
    Stack,
    Feasibility,
    Risk,
    Unified,
}

impl ConsensusDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsensusDomain::Architecture => "architecture",
            ConsensusDomain::Stack => "stack",
            ConsensusDomain::Feasibility => "feasibility",
            ConsensusDomain::Risk => "risk",
            ConsensusDomain::Unified => "unified",
        }
    }
}

impl fmt::Display for ConsensusDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Winning architecture pattern and the vote tallies behind it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureRecommendation {
    pub pattern: Option<String>,
    pub votes: BTreeMap<String, usize>,
    pub alternatives: BTreeMap<String, usize>,
}

/// Chosen technology for one stack category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackRecommendation {
    pub technology: String,
    /// `0.6 × vote_share + 0.4 × mean_score / 10`
    pub weighted_score: f64,
    pub agreement: f64,
}

/// Merged feasibility estimate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityRecommendation {
    pub score: Option<f64>,
    pub timeline_weeks: Option<f64>,
    pub team_size: Option<f64>,
}

/// Merged severity for one risk category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub severity: f64,
    pub agreement: f64,
}

/// Everything the four sub-domains recommend, side by side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedRecommendation {
    pub architecture: ArchitectureRecommendation,
    pub tech_stack: BTreeMap<String, StackRecommendation>,
    pub feasibility: FeasibilityRecommendation,
    pub risks: BTreeMap<String, RiskAssessment>,
    /// De-duplicated free-text recommendations from all valid responses
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MergedRecommendation {
    Architecture(ArchitectureRecommendation),
    Stack(BTreeMap<String, StackRecommendation>),
    Feasibility(FeasibilityRecommendation),
    Risk(BTreeMap<String, RiskAssessment>),
    Unified(Box<UnifiedRecommendation>),
}

/// Aggregate of several backend responses for one sub-domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub domain: ConsensusDomain,
    pub consensus_level: ConsensusLevel,
    /// In [0, 1]
    pub agreement_score: f64,
    pub merged_recommendation: MergedRecommendation,
    pub conflict_areas: Vec<String>,
    pub resolution_strategy: String,
    /// In [0, 1]
    pub confidence: f64,
    pub quality_metrics: BTreeMap<String, f64>,
    /// Cost of the non-failed responses
    pub total_cost: f64,
    /// Populated on the unified result only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<BackendResponse>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ConsensusResult {
    pub fn has_conflicts(&self) -> bool {
        !self.conflict_areas.is_empty()
    }
}
