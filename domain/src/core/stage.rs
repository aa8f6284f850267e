//! Pipeline stage value object

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A step of the content pipeline (Value Object)
///
/// The five known stages run in order: idea → requirements → design →
/// architecture → implementation guide. Any other identifier is kept as
/// [`Stage::Custom`] and scored with the generic dimension table.
///
/// # Example
///
/// ```
/// use stagegate_domain::Stage;
///
/// let stage: Stage = "prd_generation".parse().unwrap();
/// assert_eq!(stage, Stage::PrdGeneration);
/// assert_eq!(stage.previous(), Some(Stage::IdeaRefinement));
///
/// let custom: Stage = "market_research".parse().unwrap();
/// assert!(custom.is_custom());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    IdeaRefinement,
    PrdGeneration,
    UxRequirements,
    TechnicalAnalysis,
    ImplementationPlaybook,
    Custom(String),
}

impl Stage {
    /// Get the wire identifier for this stage
    pub fn as_str(&self) -> &str {
        match self {
            Stage::IdeaRefinement => "idea_refinement",
            Stage::PrdGeneration => "prd_generation",
            Stage::UxRequirements => "ux_requirements",
            Stage::TechnicalAnalysis => "technical_analysis",
            Stage::ImplementationPlaybook => "implementation_playbook",
            Stage::Custom(s) => s,
        }
    }

    /// Known stages in pipeline order
    pub fn pipeline() -> [Stage; 5] {
        [
            Stage::IdeaRefinement,
            Stage::PrdGeneration,
            Stage::UxRequirements,
            Stage::TechnicalAnalysis,
            Stage::ImplementationPlaybook,
        ]
    }

    /// Position in the pipeline (custom stages have none)
    pub fn position(&self) -> Option<usize> {
        Self::pipeline().iter().position(|s| s == self)
    }

    /// The stage immediately before this one
    pub fn previous(&self) -> Option<Stage> {
        let pos = self.position()?;
        pos.checked_sub(1).map(|p| Self::pipeline()[p].clone())
    }

    /// The stage immediately after this one
    pub fn next(&self) -> Option<Stage> {
        let pos = self.position()?;
        Self::pipeline().get(pos + 1).cloned()
    }

    /// Human-readable name
    pub fn display_name(&self) -> &str {
        match self {
            Stage::IdeaRefinement => "Idea Refinement",
            Stage::PrdGeneration => "Requirements (PRD)",
            Stage::UxRequirements => "UX Requirements",
            Stage::TechnicalAnalysis => "Technical Analysis",
            Stage::ImplementationPlaybook => "Implementation Playbook",
            Stage::Custom(s) => s,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Stage::Custom(_))
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "idea_refinement" => Stage::IdeaRefinement,
            "prd_generation" => Stage::PrdGeneration,
            "ux_requirements" => Stage::UxRequirements,
            "technical_analysis" => Stage::TechnicalAnalysis,
            "implementation_playbook" => Stage::ImplementationPlaybook,
            other => Stage::Custom(other.to_string()),
        })
    }
}

impl From<&str> for Stage {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(stage) => stage,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Stage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Stage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Stage::from(s.as_str()))
    }
}
