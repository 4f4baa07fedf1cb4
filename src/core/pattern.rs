use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::error::{EmberError, Result};

/// Severity band of a pattern, derived from its base score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_score(score: f64) -> Self {
        if score >= 7.5 {
            Severity::High
        } else if score >= 5.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Declarative form of a rule, before its regex is compiled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRule {
    pub category: String,
    pub pattern: String,
    pub base_score: f64,
    pub reason: String,
    pub suggestion: String,
    pub risk: String,
    pub impact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_alternative: Option<String>,
}

/// A compiled rule from the pattern table
#[derive(Debug, Clone)]
pub struct ViolationPattern {
    pub category: String,
    pub regex: Regex,
    pub severity: Severity,
    pub base_score: f64,
    pub reason: String,
    pub suggestion: String,
    pub risk: String,
    pub impact: String,
    pub safe_alternative: Option<String>,
}

impl ViolationPattern {
    pub fn compile(rule: &PatternRule) -> Result<Self> {
        let regex = RegexBuilder::new(&rule.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                EmberError::Config(format!("pattern '{}' does not compile: {}", rule.category, e))
            })?;

        Ok(Self {
            category: rule.category.clone(),
            regex,
            severity: Severity::from_score(rule.base_score),
            base_score: rule.base_score,
            reason: rule.reason.clone(),
            suggestion: rule.suggestion.clone(),
            risk: rule.risk.clone(),
            impact: rule.impact.clone(),
            safe_alternative: rule.safe_alternative.clone(),
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Ordered set of rules. Order matters: ties on the maximum score go to the
/// earliest rule.
#[derive(Debug, Clone)]
pub struct PatternTable {
    patterns: Vec<ViolationPattern>,
}

static BUILTIN: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::from_rules(&builtin_rules()).expect("built-in patterns must compile")
});

impl PatternTable {
    pub fn from_rules(rules: &[PatternRule]) -> Result<Self> {
        let patterns = rules
            .iter()
            .map(ViolationPattern::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// The production-policy table shipped with Ember.
    pub fn builtin() -> &'static PatternTable {
        &BUILTIN
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViolationPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn categories(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.category.as_str()).collect()
    }

    pub fn contains_category(&self, category: &str) -> bool {
        self.patterns.iter().any(|p| p.category == category)
    }
}

#[allow(clippy::too_many_arguments)]
fn rule(
    category: &str,
    pattern: &str,
    base_score: f64,
    reason: &str,
    suggestion: &str,
    risk: &str,
    impact: &str,
    safe_alternative: Option<&str>,
) -> PatternRule {
    PatternRule {
        category: category.to_string(),
        pattern: pattern.to_string(),
        base_score,
        reason: reason.to_string(),
        suggestion: suggestion.to_string(),
        risk: risk.to_string(),
        impact: impact.to_string(),
        safe_alternative: safe_alternative.map(|s| s.to_string()),
    }
}

pub fn builtin_rules() -> Vec<PatternRule> {
    vec![
        rule(
            "mock_data",
            r"mock|fake|dummy|example|placeholder",
            8.0,
            "Mock or placeholder data detected in what should be production code.",
            "Wire this up to the real data source instead of hardcoding sample values.",
            "Users may see fabricated values that look real.",
            "Decisions get made on data that never existed.",
            Some("Fetch from the real API and render an explicit empty or loading state."),
        ),
        rule(
            "hardcoded_credentials",
            r#"(password|passwd|api_key|apikey|secret|token)\s*[:=]\s*["'][^"']+["']"#,
            7.5,
            "A credential appears to be hardcoded.",
            "Load secrets from the environment or a secret manager.",
            "Anyone with read access to the code can use this credential.",
            "Leaked secrets force a rotation and may expose user data.",
            Some("Read the value with std::env::var or the project's config layer."),
        ),
        rule(
            "localhost_endpoint",
            r"localhost|127\.0\.0\.1|0\.0\.0\.0",
            6.0,
            "A local development endpoint is referenced.",
            "Use a configurable base URL for the target environment.",
            "Requests will fail or hit the wrong host once deployed.",
            "Features silently break outside the developer's machine.",
            None,
        ),
        rule(
            "test_data",
            r"test_?data|sample_?data|lorem ipsum",
            5.5,
            "Test or sample data is mixed into the change.",
            "Keep fixtures in test modules and load real records here.",
            "Sample records can leak into user-facing screens.",
            "Reports and dashboards lose credibility.",
            None,
        ),
        rule(
            "incomplete_code",
            r"\bTODO\b|\bFIXME\b|not implemented|unimplemented!",
            5.0,
            "The change contains unfinished code markers.",
            "Finish the implementation or track the gap in an issue before shipping.",
            "Code paths may panic or return nothing when reached.",
            "Users hit half-built features.",
            None,
        ),
        rule(
            "debug_output",
            r"console\.log|println!|\bprint\(|debugger",
            3.0,
            "Debug output left in the change.",
            "Route diagnostics through the logging framework.",
            "Noise in production logs and possible data exposure.",
            "Harder to find real problems in the logs.",
            None,
        ),
    ]
}
