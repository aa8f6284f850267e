//! Project document: per-stage records with status and quality metrics

use super::result::ContextHandoff;
use crate::content::ContentRecord;
use crate::core::stage::Stage;
use crate::quality::context::QualityContext;
use crate::quality::result::{GateStatus, QualityResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle state of one stage record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    #[default]
    Pending,
    InProgress,
    Blocked,
    NeedsReview,
    Approved,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::InProgress => "in_progress",
            StageStatus::Blocked => "blocked",
            StageStatus::NeedsReview => "needs_review",
            StageStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<GateStatus> for StageStatus {
    fn from(status: GateStatus) -> Self {
        match status {
            GateStatus::Block => StageStatus::Blocked,
            GateStatus::ProceedWithCaution => StageStatus::NeedsReview,
            GateStatus::ProceedExcellent => StageStatus::Approved,
        }
    }
}

/// Stored digest of a [`QualityResult`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub overall_score: f64,
    pub gate_status: GateStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_consistency: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dimension_scores: BTreeMap<String, f64>,
}

impl QualityMetrics {
    pub fn new(overall_score: f64, gate_status: GateStatus) -> Self {
        Self {
            overall_score,
            gate_status,
            confidence: None,
            context_consistency: None,
            dimension_scores: BTreeMap::new(),
        }
    }
}

impl From<&QualityResult> for QualityMetrics {
    fn from(result: &QualityResult) -> Self {
        Self {
            overall_score: result.overall_score,
            gate_status: result.gate_status,
            confidence: Some(result.confidence),
            context_consistency: result.context_consistency,
            dimension_scores: result.dimension_scores.clone(),
        }
    }
}

/// One stage's stored sub-record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageRecord {
    pub status: StageStatus,
    /// Absent or unreadable metrics count as "no result"
    #[serde(deserialize_with = "lenient_metrics", skip_serializing_if = "Option::is_none")]
    pub quality_metrics: Option<QualityMetrics>,
    pub content: ContentRecord,
    #[serde(deserialize_with = "lenient_handoff", skip_serializing_if = "Option::is_none")]
    pub input_context: Option<ContextHandoff>,
}

impl StageRecord {
    pub fn with_content(content: ContentRecord) -> Self {
        Self {
            content,
            ..Default::default()
        }
    }
}

fn lenient_metrics<'de, D>(deserializer: D) -> Result<Option<QualityMetrics>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_handoff<'de, D>(deserializer: D) -> Result<Option<ContextHandoff>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A project and its stage records, as read from the project store
///
/// # Example
///
/// ```
/// use stagegate_domain::{ProjectSnapshot, Stage};
///
/// let project: ProjectSnapshot = serde_json::from_str(r#"{
///     "id": "proj-1",
///     "context": {"projectType": "mvp"},
///     "stages": {
///         "idea_refinement": {
///             "status": "approved",
///             "qualityMetrics": {"overallScore": 82.0, "gateStatus": "PROCEED_WITH_CAUTION"},
///             "content": {"problemStatement": "Late invoices"}
///         }
///     }
/// }"#).unwrap();
///
/// assert_eq!(project.quality_score(&Stage::IdeaRefinement), Some(82.0));
/// assert!(project.available_context().contains_key("problemStatement"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub context: QualityContext,
    #[serde(default)]
    pub stages: BTreeMap<Stage, StageRecord>,
}

impl ProjectSnapshot {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: QualityContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_stage(mut self, stage: Stage, record: StageRecord) -> Self {
        self.stages.insert(stage, record);
        self
    }

    pub fn stage(&self, stage: &Stage) -> Option<&StageRecord> {
        self.stages.get(stage)
    }

    /// Record for `stage`, created empty when missing
    pub fn stage_mut(&mut self, stage: &Stage) -> &mut StageRecord {
        self.stages.entry(stage.clone()).or_default()
    }

    pub fn quality_metrics(&self, stage: &Stage) -> Option<&QualityMetrics> {
        self.stage(stage)?.quality_metrics.as_ref()
    }

    pub fn quality_score(&self, stage: &Stage) -> Option<f64> {
        self.quality_metrics(stage).map(|m| m.overall_score)
    }

    pub fn content(&self, stage: &Stage) -> Option<&ContentRecord> {
        self.stage(stage).map(|r| &r.content)
    }

    /// Union of all object-typed stage contents.
    ///
    /// Stages are merged in pipeline order (custom stages last), so a later
    /// stage wins a key collision.
    pub fn available_context(&self) -> Map<String, Value> {
        let mut merged = Map::new();
        for record in self.stages.values() {
            if let Some(fields) = record.content.as_object() {
                for (key, value) in fields {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_or_bad_metrics_are_absent() {
        let project: ProjectSnapshot = serde_json::from_value(json!({
            "id": "p",
            "stages": {
                "idea_refinement": {"status": "approved", "qualityMetrics": "oops"},
                "prd_generation": {"status": "in_progress"}
            }
        }))
        .unwrap();
        assert!(project.quality_metrics(&Stage::IdeaRefinement).is_none());
        assert!(project.quality_metrics(&Stage::PrdGeneration).is_none());
        assert_eq!(
            project.stage(&Stage::PrdGeneration).map(|r| r.status),
            Some(StageStatus::InProgress)
        );
    }

    #[test]
    fn test_available_context_later_stage_wins() {
        let project = ProjectSnapshot::new("p")
            .with_stage(
                Stage::PrdGeneration,
                StageRecord::with_content(ContentRecord::new(json!({"scope": "late"}))),
            )
            .with_stage(
                Stage::IdeaRefinement,
                StageRecord::with_content(ContentRecord::new(
                    json!({"scope": "early", "problemStatement": "x"}),
                )),
            )
            .with_stage(
                Stage::UxRequirements,
                StageRecord::with_content(ContentRecord::new(json!("not an object"))),
            );
        let context = project.available_context();
        assert_eq!(context["scope"], json!("late"));
        assert_eq!(context["problemStatement"], json!("x"));
        assert_eq!(context.len(), 2);
    }

    #[test]
    fn test_stage_status_from_gate() {
        assert_eq!(StageStatus::from(GateStatus::Block), StageStatus::Blocked);
        assert_eq!(
            StageStatus::from(GateStatus::ProceedWithCaution),
            StageStatus::NeedsReview
        );
        assert_eq!(StageStatus::from(GateStatus::ProceedExcellent), StageStatus::Approved);
    }

    #[test]
    fn test_roundtrip_keeps_wire_names() {
        let mut project = ProjectSnapshot::new("p");
        project.stage_mut(&Stage::IdeaRefinement).quality_metrics =
            Some(QualityMetrics::new(81.0, GateStatus::ProceedExcellent));
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(
            json["stages"]["idea_refinement"]["qualityMetrics"]["gateStatus"],
            json!("PROCEED_EXCELLENT")
        );
        assert_eq!(json["stages"]["idea_refinement"]["status"], json!("pending"));
    }
}
