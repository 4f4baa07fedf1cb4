use serde::Serialize;
use serde_json::Value;

use super::error::{EmberError, Result};
use super::learning::{total_adjustment, LearningEntry};
use super::pattern::{PatternTable, Severity, ViolationPattern};
use super::session::{SessionContext, TaskType};

pub const WARN_THRESHOLD: f64 = 5.0;
pub const BLOCK_THRESHOLD: f64 = 8.0;
pub const MAX_SCORE: f64 = 10.0;

const UTILITY_DISCOUNT: f64 = 2.0;
const TESTING_DISCOUNT: f64 = 1.5;
const UTILITY_MARKERS: [&str; 3] = ["util", "tool", "helper"];

/// What the caller is about to do
#[derive(Debug, Clone, Default)]
pub struct ActionPayload {
    pub action: String,
    pub params: Value,
    pub context: String,
}

impl ActionPayload {
    pub fn new(action: impl Into<String>, params: Value, context: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params,
            context: context.into(),
        }
    }

    /// Text the pattern table is matched against. Parameters contribute their
    /// raw keys and leaf values, one per line, so quotes inside string values
    /// reach the patterns unescaped.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();
        collect_leaves(&self.params, &mut lines);
        format!("{}\n{}\n{}", self.action, lines.join("\n"), self.context)
    }
}

fn collect_leaves(value: &Value, lines: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::String(s) => lines.push(s.clone()),
        Value::Bool(_) | Value::Number(_) => lines.push(value.to_string()),
        Value::Array(items) => {
            for item in items {
                collect_leaves(item, lines);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                lines.push(key.clone());
                collect_leaves(item, lines);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Clean,
    Warning,
    Blocked,
}

impl Tier {
    pub fn from_score(score: f64) -> Self {
        if score >= BLOCK_THRESHOLD {
            Tier::Blocked
        } else if score >= WARN_THRESHOLD {
            Tier::Warning
        } else {
            Tier::Clean
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub category: String,
    pub severity: Severity,
    pub base_score: f64,
    pub adjusted_score: f64,
    pub reason: String,
    pub suggestion: String,
    pub risk: String,
    pub impact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_alternative: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViolationReport {
    pub has_violations: bool,
    pub violations: Vec<Violation>,
    pub max_score: f64,
    pub block: bool,
    pub tier: Tier,
    pub message: String,
}

impl ViolationReport {
    /// The violation reaching the maximum score; the first one wins ties.
    pub fn primary(&self) -> Option<&Violation> {
        let mut primary: Option<&Violation> = None;
        for violation in &self.violations {
            match primary {
                Some(current) if violation.adjusted_score <= current.adjusted_score => {}
                _ => primary = Some(violation),
            }
        }
        primary
    }

    pub fn is_flagged(&self) -> bool {
        self.tier != Tier::Clean
    }
}

/// Matches action payloads against the pattern table and applies session and
/// learning adjustments. Pure: no disk or network access.
#[derive(Debug, Clone)]
pub struct ViolationScorer {
    table: PatternTable,
}

impl Default for ViolationScorer {
    fn default() -> Self {
        Self::new(PatternTable::builtin().clone())
    }
}

impl ViolationScorer {
    pub fn new(table: PatternTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    pub fn check(
        &self,
        payload: &ActionPayload,
        session: &SessionContext,
        learning: &[LearningEntry],
    ) -> Result<ViolationReport> {
        if payload.action.trim().is_empty() {
            return Err(EmberError::InvalidInput("action name is required".to_string()));
        }

        let text = payload.to_text();
        let violations: Vec<Violation> = self
            .table
            .iter()
            .filter(|pattern| pattern.is_match(&text))
            .map(|pattern| {
                let adjusted =
                    adjusted_score(pattern.base_score, &payload.action, session, learning);
                to_violation(pattern, adjusted)
            })
            .collect();

        let mut report = ViolationReport {
            has_violations: !violations.is_empty(),
            violations,
            max_score: 0.0,
            block: false,
            tier: Tier::Clean,
            message: String::new(),
        };

        let (max_score, message) = match report.primary() {
            Some(primary) => (primary.adjusted_score, build_message(primary, report.violations.len())),
            None => (0.0, "✅ No production-policy violations detected.".to_string()),
        };

        report.max_score = max_score;
        report.tier = Tier::from_score(max_score);
        report.block = report.tier == Tier::Blocked;
        report.message = message;
        Ok(report)
    }
}

/// Context-adjusted score for one match, clamped to [0, 10].
pub fn adjusted_score(
    base_score: f64,
    action: &str,
    session: &SessionContext,
    learning: &[LearningEntry],
) -> f64 {
    let mut score = base_score;
    let task_type = session.effective_task_type();
    let action_lower = action.to_lowercase();

    if task_type == TaskType::Development
        && UTILITY_MARKERS.iter().any(|marker| action_lower.contains(marker))
    {
        score -= UTILITY_DISCOUNT;
    }

    if matches!(task_type, TaskType::Testing | TaskType::Monitoring) {
        score -= TESTING_DISCOUNT;
    }

    score += total_adjustment(action, learning);

    score.clamp(0.0, MAX_SCORE)
}

fn to_violation(pattern: &ViolationPattern, adjusted_score: f64) -> Violation {
    Violation {
        category: pattern.category.clone(),
        severity: pattern.severity,
        base_score: pattern.base_score,
        adjusted_score,
        reason: pattern.reason.clone(),
        suggestion: pattern.suggestion.clone(),
        risk: pattern.risk.clone(),
        impact: pattern.impact.clone(),
        safe_alternative: pattern.safe_alternative.clone(),
    }
}

fn build_message(primary: &Violation, match_count: usize) -> String {
    let tier = Tier::from_score(primary.adjusted_score);

    if tier == Tier::Clean {
        return format!(
            "✅ No blocking violations. {} low-severity match(es) noted, highest: {} ({:.1}/10).",
            match_count, primary.category, primary.adjusted_score
        );
    }

    let banner = match tier {
        Tier::Blocked => "🛑 BLOCKED",
        _ => "⚠️ CAUTION",
    };

    let mut message = format!(
        "{} [{} {:.1}/10]: {}\n\nRisk: {}\nImpact: {}\nSuggestion: {}",
        banner,
        primary.category,
        primary.adjusted_score,
        primary.reason,
        primary.risk,
        primary.impact,
        primary.suggestion
    );

    if let Some(alternative) = &primary.safe_alternative {
        message.push_str(&format!("\nSafe alternative: {}", alternative));
    }

    message.push_str("\n\n");
    message.push_str(match tier {
        Tier::Blocked => "This action was blocked to keep production clean.",
        _ => "This action has been logged. Proceed with caution.",
    });

    message
}
