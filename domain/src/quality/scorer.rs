//! Dimension Scorer
//!
//! Deterministic rule-based heuristics, one assessor per (stage, dimension).
//! Every assessor returns a score clamped to [0, 100]:
//!
//! - a required field that is absent or too short scores [`FLOOR_SCORE`]
//! - malformed content (not a record) scores [`NEUTRAL_SCORE`] everywhere
//! - a dimension with no assessor falls back to [`generic_size_score`]

use super::signals::{
    VAGUE_WORDS, category_hits, char_len, contains_any, has_digits, keyword_hits,
    token_occurrences, word_count,
};
use crate::content::{
    ContentRecord, IdeaContent, MarketAnalysis, PlaybookContent, PrdContent, StageContent,
    TechnicalContent, TextList, UxContent,
};
use std::collections::BTreeMap;

pub const FLOOR_SCORE: f64 = 20.0;
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Size-based fallback: <50 chars → 30, <200 → 60, <500 → 75, else 85
pub fn generic_size_score(record: &ContentRecord) -> f64 {
    match record.serialized_len() {
        n if n < 50 => 30.0,
        n if n < 200 => 60.0,
        n if n < 500 => 75.0,
        _ => 85.0,
    }
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

fn bonus(condition: bool, amount: f64) -> f64 {
    if condition { amount } else { 0.0 }
}

fn length_base(len: usize) -> f64 {
    match len {
        n if n < 100 => 50.0,
        n if n < 200 => 60.0,
        _ => 70.0,
    }
}

fn vague_penalty(text: &str) -> f64 {
    5.0 * keyword_hits(text, VAGUE_WORDS) as f64
}

/// Stateless scorer for a single content dimension
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionScorer;

impl DimensionScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, dimension: &str, content: &StageContent, record: &ContentRecord) -> f64 {
        let assessed = match content {
            StageContent::Malformed => return NEUTRAL_SCORE,
            StageContent::Idea(c) => assess_idea(dimension, c),
            StageContent::Prd(c) => assess_prd(dimension, c),
            StageContent::Ux(c) => assess_ux(dimension, c),
            StageContent::Technical(c) => assess_technical(dimension, c),
            StageContent::Playbook(c) => assess_playbook(dimension, c),
            StageContent::Generic => None,
        };
        clamp_score(assessed.unwrap_or_else(|| generic_size_score(record)))
    }
}

// ==================== Idea refinement ====================

const WHO: &[&str] = &[
    "who", "users", "user", "customers", "customer", "people", "teams", "owners", "developers",
    "students", "patients", "businesses",
];
const WHAT: &[&str] = &[
    "what", "problem", "issue", "challenge", "pain", "struggle", "struggles", "lack",
    "difficult",
];
const WHEN: &[&str] = &[
    "when", "daily", "weekly", "currently", "during", "every", "time", "today",
];
const WHERE: &[&str] = &[
    "where", "market", "industry", "online", "workplace", "region", "remote", "office",
];
const WHY: &[&str] = &[
    "why", "because", "due to", "leads to", "results in", "causes", "so that",
];

const SPECIFIC_AUDIENCE: &[&str] = &[
    "aged", "age", "professionals", "developers", "engineers", "students", "managers", "owners",
    "freelancers", "founders", "teams", "small", "enterprise", "b2b", "b2c", "nurses",
    "teachers", "parents", "retailers", "agencies",
];
const GENERIC_AUDIENCE: &[&str] = &[
    "everyone", "anyone", "everybody", "all", "people", "users", "general", "public",
];

const BENEFITS: &[&str] = &[
    "save", "saves", "reduce", "reduces", "increase", "increases", "faster", "easier", "cheaper",
    "automate", "automates", "improve", "improves", "eliminate", "eliminates",
];
const DIFFERENTIATORS: &[&str] = &[
    "unlike", "only", "first", "unique", "instead of", "better than", "compared to",
];

fn assess_idea(dimension: &str, c: &IdeaContent) -> Option<f64> {
    Some(match dimension {
        "problem_clarity" => problem_clarity(&c.problem_statement),
        "target_audience" => target_audience(&c.target_audience),
        "value_proposition" => value_proposition(&c.value_proposition),
        "market_viability" => market_viability(&c.market_analysis),
        _ => return None,
    })
}

fn problem_clarity(text: &str) -> f64 {
    let len = char_len(text);
    if len < 20 {
        return FLOOR_SCORE;
    }
    let categories: [&[&str]; 5] = [WHO, WHAT, WHEN, WHERE, WHY];
    length_base(len) + 5.0 * category_hits(text, &categories) as f64 - vague_penalty(text)
        + bonus(has_digits(text), 5.0)
}

fn target_audience(text: &str) -> f64 {
    let len = char_len(text);
    if len < 10 {
        return FLOOR_SCORE;
    }
    let specific = token_occurrences(text, SPECIFIC_AUDIENCE);
    let generic = token_occurrences(text, GENERIC_AUDIENCE);
    let shift = if specific > generic {
        20.0
    } else if generic > specific {
        -15.0
    } else {
        0.0
    };
    50.0 + bonus(len >= 50, 10.0) + shift + bonus(has_digits(text), 10.0)
}

fn value_proposition(text: &str) -> f64 {
    if char_len(text) < 10 {
        return FLOOR_SCORE;
    }
    55.0 + 5.0 * keyword_hits(text, BENEFITS).min(4) as f64
        + bonus(contains_any(text, DIFFERENTIATORS), 10.0)
        - vague_penalty(text)
        + bonus(has_digits(text), 10.0)
}

fn market_viability(market: &MarketAnalysis) -> f64 {
    if market.is_empty() {
        return FLOOR_SCORE;
    }
    40.0 + bonus(!market.competitors.is_empty(), 15.0)
        + bonus(!market.market_size.is_empty(), 15.0)
        + bonus(!market.trends.is_empty(), 10.0)
        + bonus(!market.pricing.is_empty(), 10.0)
        + bonus(has_digits(&market.text()), 10.0)
}

// ==================== Requirements ====================

const TESTABLE: &[&str] = &[
    "given", "when", "then", "should", "must", "within", "at least", "no more than",
    "less than", "returns", "displays",
];

fn assess_prd(dimension: &str, c: &PrdContent) -> Option<f64> {
    Some(match dimension {
        "requirements_completeness" => requirements_completeness(c),
        "user_story_quality" => user_story_quality(&c.user_stories),
        "acceptance_criteria" => acceptance_criteria(&c.acceptance_criteria),
        "scope_definition" => scope_definition(&c.scope, &c.out_of_scope),
        _ => return None,
    })
}

fn requirements_completeness(c: &PrdContent) -> f64 {
    let count = c.features.len();
    if count == 0 {
        return FLOOR_SCORE;
    }
    let avg_len =
        c.features.items().iter().map(|f| char_len(f)).sum::<usize>() as f64 / count as f64;
    40.0 + 10.0 * count.min(5) as f64 + bonus(!c.success_metrics.is_empty(), 10.0)
        - bonus(avg_len < 15.0, 10.0)
}

fn user_story_quality(stories: &TextList) -> f64 {
    if stories.is_empty() {
        return FLOOR_SCORE;
    }
    let mut credit = 0.0;
    for story in stories.items() {
        let lower = story.to_lowercase();
        let has_role = lower.contains("as a ") || lower.contains("as an ");
        let has_want = lower.contains("i want") || lower.contains("i need");
        if has_role && has_want {
            credit += if lower.contains("so that") { 1.0 } else { 0.5 };
        }
    }
    let fraction = credit / stories.len() as f64;
    40.0 + 50.0 * fraction + bonus(stories.len() >= 3, 5.0)
}

fn acceptance_criteria(criteria: &TextList) -> f64 {
    if criteria.is_empty() {
        return FLOOR_SCORE;
    }
    let testable = criteria
        .items()
        .iter()
        .filter(|c| contains_any(c, TESTABLE))
        .count();
    let fraction = testable as f64 / criteria.len() as f64;
    40.0 + 45.0 * fraction + bonus(has_digits(&criteria.joined()), 10.0)
}

fn scope_definition(scope: &str, out_of_scope: &TextList) -> f64 {
    let len = char_len(scope);
    if len < 20 && out_of_scope.is_empty() {
        return FLOOR_SCORE;
    }
    50.0 + bonus(!out_of_scope.is_empty(), 15.0) + bonus(len >= 100, 10.0) - vague_penalty(scope)
        + bonus(has_digits(scope), 5.0)
}

// ==================== UX requirements ====================

const EDGE_CASES: &[&str] = &[
    "error", "fail", "failure", "empty", "edge", "offline", "timeout", "retry",
];
const A11Y: &[&str] = &[
    "wcag", "contrast", "screen reader", "keyboard", "aria", "alt text", "focus", "captions",
    "zoom",
];
const INTERACTION_VERBS: &[&str] = &[
    "click", "tap", "swipe", "drag", "hover", "submit", "toggle", "scroll", "select", "type",
    "press",
];
const DESIGN_TOKENS: &[&str] = &[
    "color", "colour", "typography", "spacing", "component", "components", "grid", "token",
    "tokens", "icon", "icons",
];

fn assess_ux(dimension: &str, c: &UxContent) -> Option<f64> {
    Some(match dimension {
        "user_journey_coverage" => user_journey_coverage(&c.user_journeys),
        "accessibility" => accessibility(&c.accessibility),
        "interaction_clarity" => interaction_clarity(&c.interaction_patterns),
        "design_consistency" => design_consistency(&c.design_system, &c.screens),
        _ => return None,
    })
}

fn user_journey_coverage(journeys: &TextList) -> f64 {
    if journeys.is_empty() {
        return FLOOR_SCORE;
    }
    40.0 + 12.0 * journeys.len().min(4) as f64
        + bonus(contains_any(&journeys.joined(), EDGE_CASES), 7.0)
}

fn accessibility(requirements: &TextList) -> f64 {
    if requirements.is_empty() {
        return FLOOR_SCORE;
    }
    let text = requirements.joined();
    45.0 + 8.0 * keyword_hits(&text, A11Y) as f64 + bonus(has_digits(&text), 5.0)
}

fn interaction_clarity(patterns: &TextList) -> f64 {
    if patterns.is_empty() {
        return FLOOR_SCORE;
    }
    let text = patterns.joined();
    50.0 + 5.0 * keyword_hits(&text, INTERACTION_VERBS).min(6) as f64 - vague_penalty(&text)
}

fn design_consistency(design_system: &str, screens: &TextList) -> f64 {
    let len = char_len(design_system);
    if len < 10 && screens.is_empty() {
        return FLOOR_SCORE;
    }
    50.0 + bonus(len >= 10, 15.0)
        + 5.0 * keyword_hits(design_system, DESIGN_TOKENS) as f64
        + bonus(screens.len() >= 3, 10.0)
}

// ==================== Technical analysis ====================

const PATTERNS: &[&str] = &[
    "microservices", "monolith", "serverless", "event-driven", "layered", "hexagonal", "mvc",
    "modular", "client-server",
];
const QUALITY_ATTRIBUTES: &[&str] = &[
    "scalability", "scalable", "availability", "latency", "security", "resilience", "caching",
    "cache", "throughput", "fault",
];
const TIMELINE: &[&str] = &[
    "week", "weeks", "month", "months", "sprint", "sprints", "milestone", "quarter",
];
const TEAM: &[&str] = &[
    "developer", "developers", "engineer", "engineers", "team", "designer",
];
const MITIGATION: &[&str] = &[
    "mitigate", "mitigation", "fallback", "backup", "monitor", "monitoring", "contingency",
    "retry", "redundancy",
];

fn assess_technical(dimension: &str, c: &TechnicalContent) -> Option<f64> {
    Some(match dimension {
        "architecture_soundness" => architecture_soundness(&c.architecture),
        "stack_fit" => stack_fit(&c.tech_stack),
        "feasibility" => feasibility(&c.feasibility),
        "risk_coverage" => risk_coverage(&c.risks),
        _ => return None,
    })
}

fn architecture_soundness(text: &str) -> f64 {
    let len = char_len(text);
    if len < 20 {
        return FLOOR_SCORE;
    }
    length_base(len) + bonus(contains_any(text, PATTERNS), 10.0)
        + 5.0 * keyword_hits(text, QUALITY_ATTRIBUTES) as f64
        - vague_penalty(text)
}

fn stack_fit(stack: &BTreeMap<String, String>) -> f64 {
    if stack.is_empty() {
        return FLOOR_SCORE;
    }
    let values = stack.values().cloned().collect::<Vec<_>>().join(" ");
    40.0 + 10.0 * stack.len().min(5) as f64 + bonus(has_digits(&values), 5.0)
}

fn feasibility(text: &str) -> f64 {
    if char_len(text) < 20 {
        return FLOOR_SCORE;
    }
    55.0 + 5.0 * keyword_hits(text, TIMELINE) as f64
        + bonus(contains_any(text, TEAM), 5.0)
        + bonus(has_digits(text), 10.0)
        - vague_penalty(text)
}

fn risk_coverage(risks: &TextList) -> f64 {
    if risks.is_empty() {
        return FLOOR_SCORE;
    }
    let mitigated = risks
        .items()
        .iter()
        .filter(|r| contains_any(r, MITIGATION))
        .count();
    let fraction = mitigated as f64 / risks.len() as f64;
    40.0 + 10.0 * risks.len().min(4) as f64 + bonus(fraction >= 0.5, 10.0)
}

// ==================== Implementation playbook ====================

const ORDERING: &[&str] = &[
    "before", "after", "then", "first", "phase", "followed", "depends", "prerequisite",
];
const TEST_KINDS: &[&str] = &[
    "unit", "integration", "e2e", "end-to-end", "coverage", "regression", "performance", "load",
    "acceptance", "smoke",
];
const DEPLOYMENT: &[&str] = &[
    "ci", "cd", "pipeline", "rollback", "staging", "monitoring", "docker", "kubernetes",
    "blue-green", "canary", "feature flag",
];

fn assess_playbook(dimension: &str, c: &PlaybookContent) -> Option<f64> {
    Some(match dimension {
        "task_breakdown" => task_breakdown(&c.tasks),
        "sequencing" => sequencing(&c.milestones, &c.dependencies),
        "testing_strategy" => testing_strategy(&c.testing_strategy),
        "deployment_readiness" => deployment_readiness(&c.deployment_plan),
        _ => return None,
    })
}

fn task_breakdown(tasks: &TextList) -> f64 {
    if tasks.is_empty() {
        return FLOOR_SCORE;
    }
    let avg_words = tasks.items().iter().map(|t| word_count(t)).sum::<usize>() as f64
        / tasks.len() as f64;
    40.0 + 5.0 * tasks.len().min(8) as f64 + bonus(avg_words >= 5.0, 10.0)
        + bonus(has_digits(&tasks.joined()), 5.0)
}

fn sequencing(milestones: &TextList, dependencies: &TextList) -> f64 {
    if milestones.is_empty() && dependencies.is_empty() {
        return FLOOR_SCORE;
    }
    let text = format!("{} {}", milestones.joined(), dependencies.joined());
    50.0 + bonus(milestones.len() >= 2, 15.0)
        + bonus(!dependencies.is_empty(), 15.0)
        + 5.0 * keyword_hits(&text, ORDERING).min(3) as f64
}

fn testing_strategy(text: &str) -> f64 {
    if char_len(text) < 20 {
        return FLOOR_SCORE;
    }
    50.0 + 6.0 * keyword_hits(text, TEST_KINDS) as f64 + bonus(has_digits(text), 8.0)
}

fn deployment_readiness(text: &str) -> f64 {
    if char_len(text) < 20 {
        return FLOOR_SCORE;
    }
    50.0 + 6.0 * keyword_hits(text, DEPLOYMENT) as f64 - vague_penalty(text)
}
