//! Console output formatter for stagegate results

use colored::{ColoredString, Colorize};
use serde::Serialize;
use stagegate_domain::core::string::{single_line, truncate};
use stagegate_domain::{
    ConsensusResult, ContextHandoff, CrossStageValidationResult, GateStatus, MergedRecommendation,
    QualityImpact, QualityResult, QualityThresholds, RoadmapItemKind, StageStatus,
    TechnicalEvaluation,
};

/// Characters of a backend's raw reply shown in text output
const REPLY_PREVIEW_CHARS: usize = 100;
/// Characters of a handed-off context value shown in text output
const VALUE_PREVIEW_CHARS: usize = 80;

/// Formats command results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Turn colors off for the rest of the process
    pub fn set_color(enabled: bool) {
        if !enabled {
            colored::control::set_override(false);
        }
    }

    /// Format any result as pretty JSON
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format a stage score with its gate decision
    pub fn format_quality(result: &QualityResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!(
            "Quality Gate: {}",
            result.stage.display_name()
        )));
        output.push('\n');

        output.push_str(&format!(
            "{} {:.1} / 100   {} {}\n",
            "Score:".cyan().bold(),
            result.overall_score,
            "Gate:".cyan().bold(),
            Self::gate_label(result.gate_status)
        ));
        output.push_str(&format!(
            "{} minimum {:.1}, recommended {:.1}\n",
            "Thresholds:".cyan().bold(),
            result.thresholds.minimum,
            result.thresholds.recommended
        ));
        output.push_str(&format!(
            "{} {:.2}\n",
            "Confidence:".cyan().bold(),
            result.confidence
        ));
        if let Some(consistency) = result.context_consistency {
            output.push_str(&format!(
                "{} {:.2}\n",
                "Context consistency:".cyan().bold(),
                consistency
            ));
        }

        output.push_str(&Self::section_header("Dimensions"));
        for (dimension, score) in &result.dimension_scores {
            let line = format!("  {:<28} {:>5.1}", dimension, score);
            if *score < result.thresholds.minimum {
                output.push_str(&format!("{}\n", line.red()));
            } else {
                output.push_str(&format!("{}\n", line));
            }
        }

        if let Some(technical) = &result.technical_evaluation {
            output.push_str(&Self::section_header("Technical Evaluation"));
            output.push_str(&format!(
                "  quality {:.1}, consensus {} (agreement {:.2})\n",
                technical.quality_score, technical.consensus_level, technical.agreement_score
            ));
            if !technical.conflict_areas.is_empty() {
                output.push_str(&format!(
                    "  {} {}\n",
                    "conflicts:".yellow(),
                    technical.conflict_areas.join(", ")
                ));
            }
        }

        if !result.improvement_suggestions.is_empty() {
            output.push_str(&Self::section_header("Suggested Improvements"));
            for suggestion in &result.improvement_suggestions {
                output.push_str(&format!(
                    "\n{} {}\n  {}\n  {} ~{} min, +{:.1} points\n",
                    format!("[{}]", suggestion.dimension).yellow().bold(),
                    suggestion.message,
                    suggestion.action,
                    "effort:".dimmed(),
                    suggestion.estimated_minutes,
                    suggestion.potential_gain
                ));
            }
            output.push_str(&format!(
                "\n{} ~{} min\n",
                "Estimated total effort:".bold(),
                result.estimated_improvement_minutes
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format a gate result together with the stored stage status
    pub fn format_gate(result: &QualityResult, status: StageStatus) -> String {
        let mut output = Self::format_quality(result);
        output.push_str(&format!(
            "{} {} -> {}\n",
            "Stage status:".cyan().bold(),
            result.stage,
            Self::status_label(status)
        ));
        output
    }

    /// Format context-adjusted thresholds
    pub fn format_thresholds(thresholds: &QualityThresholds) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {}\n",
            "Stage:".cyan().bold(),
            thresholds.stage.display_name()
        ));
        output.push_str(&format!(
            "{} {:.1}\n{} {:.1}\n",
            "Minimum:".cyan().bold(),
            thresholds.minimum,
            "Recommended:".cyan().bold(),
            thresholds.recommended
        ));

        let ctx = &thresholds.context_factors;
        let factors: Vec<String> = [
            ctx.complexity.map(|c| format!("complexity={}", c)),
            ctx.user_experience.map(|u| format!("user_experience={}", u)),
            ctx.project_type.map(|p| format!("project_type={}", p)),
        ]
        .into_iter()
        .flatten()
        .collect();
        if factors.is_empty() {
            output.push_str(&format!("{} none\n", "Context:".cyan().bold()));
        } else {
            output.push_str(&format!(
                "{} {}\n",
                "Context:".cyan().bold(),
                factors.join(", ")
            ));
        }

        if !thresholds.adjustments_applied.is_empty() {
            output.push_str(&format!("{}\n", "Adjustments:".cyan().bold()));
            for (factor, delta) in &thresholds.adjustments_applied {
                output.push_str(&format!("  {:<18} {:+.0}\n", factor, delta));
            }
        }

        output
    }

    /// Format a multi-backend technical evaluation
    pub fn format_evaluation(evaluation: &TechnicalEvaluation) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Technical Evaluation"));
        output.push('\n');

        output.push_str(&format!(
            "{} {:.1} / 100\n",
            "Quality:".cyan().bold(),
            evaluation.quality_score
        ));
        output.push_str(&format!(
            "{} {} (agreement {:.2}, confidence {:.2})\n",
            "Consensus:".cyan().bold(),
            evaluation.unified.consensus_level,
            evaluation.unified.agreement_score,
            evaluation.unified.confidence
        ));
        output.push_str(&format!(
            "{} {} ({} used), total cost ${:.4}\n",
            "Backends:".cyan().bold(),
            evaluation
                .responses()
                .iter()
                .map(|r| r.model_id.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            evaluation.backends_used(),
            evaluation.unified.total_cost
        ));

        output.push_str(&Self::section_header("Sub-domains"));
        for result in [
            &evaluation.architecture,
            &evaluation.stack,
            &evaluation.feasibility,
            &evaluation.risk,
        ] {
            output.push_str(&Self::consensus_line(result));
        }

        if let MergedRecommendation::Unified(unified) = &evaluation.unified.merged_recommendation {
            output.push_str(&Self::section_header("Recommendation"));
            output.push_str(&format!(
                "  {:<14} {}\n",
                "architecture",
                unified.architecture.pattern.as_deref().unwrap_or("-")
            ));
            for (category, choice) in &unified.tech_stack {
                output.push_str(&format!(
                    "  {:<14} {} (score {:.1}, agreement {:.2})\n",
                    category, choice.technology, choice.weighted_score, choice.agreement
                ));
            }
            let feasibility = &unified.feasibility;
            output.push_str(&format!(
                "  {:<14} score {}, {} weeks, team of {}\n",
                "feasibility",
                Self::optional(feasibility.score),
                Self::optional(feasibility.timeline_weeks),
                Self::optional(feasibility.team_size)
            ));
            for (category, risk) in &unified.risks {
                output.push_str(&format!(
                    "  {:<14} {} severity {:.1} (agreement {:.2})\n",
                    "risk",
                    category,
                    risk.severity,
                    risk.agreement
                ));
            }
            for note in &unified.recommendations {
                output.push_str(&format!("  * {}\n", note));
            }
        }

        if !evaluation.roadmap.is_empty() {
            output.push_str(&Self::section_header("Roadmap"));
            for item in &evaluation.roadmap {
                let title = match item.kind {
                    RoadmapItemKind::Phase => item.title.green().bold(),
                    RoadmapItemKind::Mitigation => item.title.yellow().bold(),
                };
                output.push_str(&format!(
                    "  {} ({} wk) {}\n",
                    title, item.weeks, item.description
                ));
            }
        }

        output.push_str(&Self::section_header("Backend Responses"));
        for response in evaluation.responses() {
            if let Some(error) = &response.error {
                output.push_str(&format!(
                    "\n{}\nError: {}\n",
                    format!("── {} ──", response.model_id).red().bold(),
                    single_line(error)
                ));
            } else {
                output.push_str(&format!(
                    "\n{}\n  confidence {:.2}, {} ms, {} tokens, ${:.4}\n  {}\n",
                    format!("── {} ──", response.model_id).yellow().bold(),
                    response.confidence,
                    response.latency_ms,
                    response.tokens_used,
                    response.cost,
                    truncate(&single_line(&response.raw_content), REPLY_PREVIEW_CHARS).dimmed()
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format a readiness or consistency check
    pub fn format_validation(result: &CrossStageValidationResult) -> String {
        let mut output = String::new();

        let title = match &result.source_stage {
            Some(source) => format!("{} -> {}", source, result.target_stage),
            None => format!("Readiness for {}", result.target_stage),
        };
        output.push_str(&format!("{}\n", title.cyan().bold()));

        let verdict = if result.is_consistent {
            "CONSISTENT".green().bold()
        } else {
            "INCONSISTENT".red().bold()
        };
        output.push_str(&format!(
            "{} {} (score {:.2}, impact {})\n",
            "Result:".bold(),
            verdict,
            result.consistency_score,
            Self::impact_label(result.quality_impact)
        ));

        if !result.rule_scores.is_empty() {
            output.push_str(&format!("{}\n", "Rules:".bold()));
            for (rule, score) in &result.rule_scores {
                output.push_str(&format!("  {:<32} {:.2}\n", rule, score));
            }
        }

        Self::push_list(&mut output, "Errors:", &result.errors, |s| s.red());
        Self::push_list(&mut output, "Warnings:", &result.warnings, |s| s.yellow());
        Self::push_list(&mut output, "Context gaps:", &result.context_gaps, |s| s.normal());
        Self::push_list(
            &mut output,
            "Recommendations:",
            &result.recommendations,
            |s| s.normal(),
        );

        output
    }

    /// Format a context handoff
    pub fn format_handoff(handoff: &ContextHandoff) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} -> {}\n",
            "Handoff:".cyan().bold(),
            handoff.source_stage,
            handoff.target_stage
        ));
        output.push_str(&format!(
            "{} {:.2}\n",
            "Consistency:".cyan().bold(),
            handoff.consistency_score
        ));
        match &handoff.quality_metrics {
            Some(metrics) => output.push_str(&format!(
                "{} {:.1} ({})\n",
                "Source quality:".cyan().bold(),
                metrics.overall_score,
                Self::gate_label(metrics.gate_status)
            )),
            None => output.push_str(&format!("{} none\n", "Source quality:".cyan().bold())),
        }

        if handoff.context_data.is_empty() {
            output.push_str(&format!("{}\n", "No context to hand off".dimmed()));
        } else {
            output.push_str(&format!("{}\n", "Context:".bold()));
            for (key, value) in &handoff.context_data {
                let text = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                output.push_str(&format!(
                    "  {:<20} {}\n",
                    key,
                    truncate(&single_line(&text), VALUE_PREVIEW_CHARS)
                ));
            }
        }

        output
    }

    /// Format configuration sources as `(label, location, found)` rows
    pub fn format_config_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str, bool)>,
    ) -> String {
        let mut output = format!("{}\n", "Configuration sources (highest priority first):".bold());
        for (label, location, found) in sources {
            let marker = if found { "v".green() } else { "-".dimmed() };
            output.push_str(&format!("  {} {:<9} {}\n", marker, label, location));
        }
        output
    }

    fn consensus_line(result: &ConsensusResult) -> String {
        let mut line = format!(
            "  {:<14} {:<13} agreement {:.2}",
            result.domain.as_str(),
            result.consensus_level.as_str(),
            result.agreement_score
        );
        if result.has_conflicts() {
            line.push_str(&format!(
                "  {} {}",
                "conflicts:".yellow(),
                result.conflict_areas.join(", ")
            ));
        }
        line.push('\n');
        line
    }

    fn push_list(
        output: &mut String,
        title: &str,
        items: &[String],
        paint: impl Fn(&str) -> ColoredString,
    ) {
        if items.is_empty() {
            return;
        }
        output.push_str(&format!("{}\n", title.bold()));
        for item in items {
            output.push_str(&format!("  * {}\n", paint(item)));
        }
    }

    fn optional(value: Option<f64>) -> String {
        value.map_or_else(|| "?".to_string(), |v| format!("{:.1}", v))
    }

    fn gate_label(status: GateStatus) -> ColoredString {
        match status {
            GateStatus::Block => status.as_str().red().bold(),
            GateStatus::ProceedWithCaution => status.as_str().yellow().bold(),
            GateStatus::ProceedExcellent => status.as_str().green().bold(),
        }
    }

    fn status_label(status: StageStatus) -> ColoredString {
        match status {
            StageStatus::Blocked => status.as_str().red(),
            StageStatus::NeedsReview => status.as_str().yellow(),
            StageStatus::Approved => status.as_str().green(),
            StageStatus::Pending | StageStatus::InProgress => status.as_str().normal(),
        }
    }

    fn impact_label(impact: QualityImpact) -> ColoredString {
        match impact {
            QualityImpact::Positive => "positive".green(),
            QualityImpact::Neutral => "neutral".normal(),
            QualityImpact::Negative => "negative".red(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
