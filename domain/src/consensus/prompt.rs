//! Prompt templates for architecture evaluation

use crate::content::ContentRecord;
use crate::quality::context::QualityContext;

/// Templates for the multi-backend architecture evaluation
pub struct EvaluationPrompt;

impl EvaluationPrompt {
    /// System prompt shared by every backend
    pub fn system() -> &'static str {
        r#"You are a senior software architect reviewing a product plan.
Evaluate the plan independently and answer with a single JSON document.
Do not include any prose outside the JSON."#
    }

    /// User prompt for the architecture evaluation of one project
    pub fn architecture(context: &ContentRecord, quality: &QualityContext) -> String {
        let rendered = serde_json::to_string_pretty(context.value())
            .unwrap_or_else(|_| context.value().to_string());

        let mut factors = Vec::new();
        if let Some(c) = quality.complexity {
            factors.push(format!("complexity: {}", c));
        }
        if let Some(e) = quality.user_experience {
            factors.push(format!("team experience: {}", e));
        }
        if let Some(p) = quality.project_type {
            factors.push(format!("project type: {}", p));
        }
        let factors = if factors.is_empty() {
            "not specified".to_string()
        } else {
            factors.join(", ")
        };

        format!(
            r#"Project context ({}):

{}

Recommend an architecture for this project. Respond with JSON in exactly this shape:

{{
  "architecture": {{"pattern": "<pattern name>", "alternatives": ["<up to two>"]}},
  "tech_stack": {{"<category>": {{"technology": "<name>", "score": <0-10>}}}},
  "feasibility": {{"score": <0-10>, "timeline_weeks": <number>, "team_size": <number>}},
  "risks": {{"<category>": <severity 1-5>}},
  "technical_scores": {{"<dimension>": <0-100>}},
  "recommendations": ["<short recommendation>"],
  "confidence": <0.0-1.0>
}}"#,
            factors, rendered
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::context::Complexity;
    use serde_json::json;

    #[test]
    fn test_architecture_prompt_includes_context() {
        let context = ContentRecord::new(json!({"features": ["Invoice reminders"]}));
        let quality = QualityContext::default().with_complexity(Complexity::Complex);
        let prompt = EvaluationPrompt::architecture(&context, &quality);

        assert!(prompt.contains("Invoice reminders"));
        assert!(prompt.contains("complexity: complex"));
        assert!(prompt.contains(r#""timeline_weeks""#));
    }

    #[test]
    fn test_prompt_without_factors() {
        let prompt =
            EvaluationPrompt::architecture(&ContentRecord::empty(), &QualityContext::default());
        assert!(prompt.contains("not specified"));
    }
}
