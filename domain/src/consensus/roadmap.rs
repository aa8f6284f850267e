//! Implementation roadmap derived from a technical evaluation

use super::result::{ArchitectureRecommendation, FeasibilityRecommendation, RiskAssessment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timeline assumed when no backend estimated one
pub const DEFAULT_TIMELINE_WEEKS: f64 = 12.0;
pub const HIGH_SEVERITY: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadmapItemKind {
    Phase,
    Mitigation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapItem {
    pub kind: RoadmapItemKind,
    pub title: String,
    pub weeks: u32,
    pub description: String,
}

const PHASES: [(&str, f64); 3] = [("Foundation", 0.25), ("Core build", 0.50), ("Hardening", 0.25)];

fn phase_weeks(total: f64, share: f64) -> u32 {
    (total * share).round().max(1.0) as u32
}

/// Three phases split 25 / 50 / 25 over the merged timeline (at least one
/// week each), then one mitigation item per conflicted or high-severity
/// risk category.
pub fn build_roadmap(
    architecture: &ArchitectureRecommendation,
    feasibility: &FeasibilityRecommendation,
    risks: &BTreeMap<String, RiskAssessment>,
    conflict_areas: &[String],
) -> Vec<RoadmapItem> {
    let total = feasibility
        .timeline_weeks
        .filter(|w| *w > 0.0)
        .unwrap_or(DEFAULT_TIMELINE_WEEKS);
    let pattern = architecture
        .pattern
        .as_deref()
        .unwrap_or("the chosen architecture");

    let descriptions = [
        format!("Set up the {} skeleton, build pipeline and environments", pattern),
        "Implement the core features end to end".to_string(),
        "Harden with load testing, security review and launch preparation".to_string(),
    ];

    let mut roadmap: Vec<RoadmapItem> = PHASES
        .iter()
        .zip(descriptions)
        .map(|((title, share), description)| RoadmapItem {
            kind: RoadmapItemKind::Phase,
            title: title.to_string(),
            weeks: phase_weeks(total, *share),
            description,
        })
        .collect();

    for (category, assessment) in risks {
        let conflicted = conflict_areas
            .iter()
            .any(|c| c.strip_prefix("risk:") == Some(category.as_str()));
        if !conflicted && assessment.severity < HIGH_SEVERITY {
            continue;
        }
        let reason = if conflicted {
            "backends disagree on its severity"
        } else {
            "rated high severity"
        };
        roadmap.push(RoadmapItem {
            kind: RoadmapItemKind::Mitigation,
            title: format!("Mitigate {} risk", category),
            weeks: 1,
            description: format!(
                "Severity {:.1}/5, {}; plan a spike and a fallback",
                assessment.severity, reason
            ),
        });
    }

    roadmap
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk(severity: f64, agreement: f64) -> RiskAssessment {
        RiskAssessment {
            severity,
            agreement,
        }
    }

    #[test]
    fn test_phases_split_timeline() {
        let feasibility = FeasibilityRecommendation {
            timeline_weeks: Some(16.0),
            ..Default::default()
        };
        let roadmap = build_roadmap(
            &ArchitectureRecommendation::default(),
            &feasibility,
            &BTreeMap::new(),
            &[],
        );
        let weeks: Vec<u32> = roadmap.iter().map(|i| i.weeks).collect();
        assert_eq!(weeks, [4, 8, 4]);
        assert!(roadmap.iter().all(|i| i.kind == RoadmapItemKind::Phase));
    }

    #[test]
    fn test_short_timeline_has_one_week_minimum() {
        let feasibility = FeasibilityRecommendation {
            timeline_weeks: Some(1.0),
            ..Default::default()
        };
        let roadmap = build_roadmap(
            &ArchitectureRecommendation::default(),
            &feasibility,
            &BTreeMap::new(),
            &[],
        );
        assert!(roadmap.iter().all(|i| i.weeks >= 1));
    }

    #[test]
    fn test_mitigations_for_high_or_conflicted_risks() {
        let risks = BTreeMap::from([
            ("cost".to_string(), risk(2.0, 1.0)),
            ("security".to_string(), risk(4.5, 1.0)),
            ("vendor".to_string(), risk(3.0, 0.2)),
        ]);
        let conflicts = vec!["risk:vendor".to_string()];
        let roadmap = build_roadmap(
            &ArchitectureRecommendation::default(),
            &FeasibilityRecommendation::default(),
            &risks,
            &conflicts,
        );
        let titles: Vec<&str> = roadmap
            .iter()
            .filter(|i| i.kind == RoadmapItemKind::Mitigation)
            .map(|i| i.title.as_str())
            .collect();
        assert_eq!(titles, ["Mitigate security risk", "Mitigate vendor risk"]);
    }
}
