//! Model reply parsing for architecture evaluation.
//!
//! A reply is free-form text that should contain one JSON document. Parsing
//! is a two-stage pipeline:
//!
//! 1. Locate the first `{` … last `}` span (tolerating markdown fences and
//!    prose around it) and deserialize it into [`EvaluationPayload`], with
//!    every field read leniently.
//! 2. Otherwise fall back to [`EvaluationPayload::default()`].
//!
//! Nothing in this module returns an error.

use crate::content::{TextList, flatten_text, lenient, lenient_text};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Confidence assumed when a reply parsed but stated none
pub const PARSED_DEFAULT_CONFIDENCE: f64 = 0.7;
/// Confidence assumed when a reply could not be parsed
pub const UNPARSED_DEFAULT_CONFIDENCE: f64 = 0.5;
/// Alternates considered per response
pub const MAX_ALTERNATIVES: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureChoice {
    #[serde(deserialize_with = "lenient_text")]
    pub pattern: String,
    pub alternatives: TextList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackChoice {
    pub technology: String,
    /// Fitness on a 0-10 scale
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeasibilityEstimate {
    #[serde(deserialize_with = "lenient_number")]
    pub score: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub timeline_weeks: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub team_size: Option<f64>,
}

/// Structured content of one backend's architecture evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationPayload {
    #[serde(deserialize_with = "lenient")]
    pub architecture: ArchitectureChoice,
    #[serde(deserialize_with = "lenient_stack")]
    pub tech_stack: BTreeMap<String, StackChoice>,
    #[serde(deserialize_with = "lenient")]
    pub feasibility: FeasibilityEstimate,
    /// Risk category → severity (1-5)
    #[serde(deserialize_with = "lenient_number_map")]
    pub risks: BTreeMap<String, f64>,
    /// Technical dimension → score (0-100)
    #[serde(deserialize_with = "lenient_number_map")]
    pub technical_scores: BTreeMap<String, f64>,
    pub recommendations: TextList,
    #[serde(deserialize_with = "lenient_number")]
    pub confidence: Option<f64>,
}

impl EvaluationPayload {
    /// Normalized architecture pattern (lowercase, trimmed)
    pub fn pattern(&self) -> Option<String> {
        normalize_label(&self.architecture.pattern)
    }

    /// Up to [`MAX_ALTERNATIVES`] normalized alternates, excluding the primary
    pub fn alternatives(&self) -> Vec<String> {
        let primary = self.pattern();
        let mut out: Vec<String> = Vec::new();
        for alt in self.architecture.alternatives.items() {
            if out.len() == MAX_ALTERNATIVES {
                break;
            }
            if let Some(alt) = normalize_label(alt)
                && Some(&alt) != primary.as_ref()
                && !out.contains(&alt)
            {
                out.push(alt);
            }
        }
        out
    }

    fn clamped(mut self) -> Self {
        for choice in self.tech_stack.values_mut() {
            choice.score = choice.score.map(|s| s.clamp(0.0, 10.0));
        }
        self.feasibility.score = self.feasibility.score.map(|s| s.clamp(0.0, 10.0));
        self.feasibility.timeline_weeks = self.feasibility.timeline_weeks.map(|w| w.max(0.0));
        self.feasibility.team_size = self.feasibility.team_size.map(|t| t.max(0.0));
        for severity in self.risks.values_mut() {
            *severity = severity.clamp(1.0, 5.0);
        }
        for score in self.technical_scores.values_mut() {
            *score = score.clamp(0.0, 100.0);
        }
        self.confidence = self.confidence.map(|c| c.clamp(0.0, 1.0));
        self
    }
}

/// Parse a reply into a payload, or `None` when no JSON object is found.
///
/// # Examples
///
/// ```
/// use stagegate_domain::consensus::parsing::parse_evaluation;
///
/// let reply = "Here you go:\n```json\n{\"architecture\": {\"pattern\": \"Microservices\"}}\n```";
/// let payload = parse_evaluation(reply).unwrap();
/// assert_eq!(payload.pattern().as_deref(), Some("microservices"));
///
/// assert!(parse_evaluation("no json here").is_none());
/// ```
pub fn parse_evaluation(reply: &str) -> Option<EvaluationPayload> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str::<EvaluationPayload>(&reply[start..=end])
        .ok()
        .map(EvaluationPayload::clamped)
}

/// Parse a reply, falling back to the default payload.
///
/// Returns the payload and the reply confidence in [0, 1].
pub fn interpret_reply(reply: &str) -> (EvaluationPayload, f64) {
    match parse_evaluation(reply) {
        Some(payload) => {
            let confidence = payload.confidence.unwrap_or(PARSED_DEFAULT_CONFIDENCE);
            (payload, confidence)
        }
        None => (EvaluationPayload::default(), UNPARSED_DEFAULT_CONFIDENCE),
    }
}

pub(crate) fn normalize_label(label: &str) -> Option<String> {
    let label = label.trim().to_lowercase();
    (!label.is_empty()).then_some(label)
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_number(&value))
}

fn lenient_number_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| Some((normalize_label(k)?, as_number(v)?)))
            .collect(),
        _ => BTreeMap::new(),
    })
}

fn lenient_stack<'de, D>(deserializer: D) -> Result<BTreeMap<String, StackChoice>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(map) = value else {
        return Ok(BTreeMap::new());
    };

    let mut stack = BTreeMap::new();
    for (category, entry) in &map {
        let Some(category) = normalize_label(category) else {
            continue;
        };
        let choice = match entry {
            Value::Object(fields) => {
                let technology = fields
                    .get("technology")
                    .or_else(|| fields.get("name"))
                    .map(flatten_text)
                    .unwrap_or_default();
                StackChoice {
                    technology,
                    score: fields.get("score").and_then(as_number),
                }
            }
            other => StackChoice {
                technology: flatten_text(other),
                score: None,
            },
        };
        if let Some(technology) = normalize_label(&choice.technology) {
            stack.insert(
                category,
                StackChoice {
                    technology,
                    score: choice.score,
                },
            );
        }
    }
    Ok(stack)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== parse_evaluation Tests ====================

    #[test]
    fn test_parse_full_document() {
        let reply = r#"{
            "architecture": {"pattern": "microservices", "alternatives": ["Modular Monolith", "serverless", "layered"]},
            "tech_stack": {"Backend": {"technology": "Rust", "score": 8}, "database": "PostgreSQL"},
            "feasibility": {"score": 7, "timeline_weeks": "12", "team_size": 4},
            "risks": {"security": 3, "scalability": 9},
            "technical_scores": {"scalability": 80, "maintainability": 140},
            "recommendations": ["Start with a modular monolith"],
            "confidence": 0.85
        }"#;
        let payload = parse_evaluation(reply).unwrap();

        assert_eq!(payload.pattern().as_deref(), Some("microservices"));
        assert_eq!(payload.alternatives(), ["modular monolith", "serverless"]);
        assert_eq!(payload.tech_stack["backend"].technology, "rust");
        assert_eq!(payload.tech_stack["backend"].score, Some(8.0));
        assert_eq!(payload.tech_stack["database"].score, None);
        assert_eq!(payload.feasibility.timeline_weeks, Some(12.0));
        assert_eq!(payload.risks["scalability"], 5.0);
        assert_eq!(payload.technical_scores["maintainability"], 100.0);
        assert_eq!(payload.recommendations.len(), 1);
        assert_eq!(payload.confidence, Some(0.85));
    }

    #[test]
    fn test_parse_with_prose_and_fence() {
        let reply = "My evaluation:\n```json\n{\"feasibility\": {\"score\": 6}}\n```\nThanks";
        let payload = parse_evaluation(reply).unwrap();
        assert_eq!(payload.feasibility.score, Some(6.0));
    }

    #[test]
    fn test_mistyped_fields_are_absent() {
        let reply = r#"{"architecture": "microservices", "risks": [1, 2], "confidence": "high"}"#;
        let payload = parse_evaluation(reply).unwrap();
        assert_eq!(payload.pattern(), None);
        assert!(payload.risks.is_empty());
        assert_eq!(payload.confidence, None);
    }

    #[test]
    fn test_unparseable_is_none() {
        assert!(parse_evaluation("").is_none());
        assert!(parse_evaluation("} backwards {").is_none());
        assert!(parse_evaluation("{not json}").is_none());
    }

    // ==================== interpret_reply Tests ====================

    #[test]
    fn test_interpret_default_confidences() {
        let (_, parsed) = interpret_reply(r#"{"architecture": {"pattern": "mvc"}}"#);
        assert_eq!(parsed, PARSED_DEFAULT_CONFIDENCE);

        let (payload, unparsed) = interpret_reply("I think microservices");
        assert_eq!(unparsed, UNPARSED_DEFAULT_CONFIDENCE);
        assert_eq!(payload, EvaluationPayload::default());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let (_, confidence) = interpret_reply(r#"{"confidence": 3.5}"#);
        assert_eq!(confidence, 1.0);
    }
}
