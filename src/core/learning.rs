use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Adjustment recorded when the user says a flag was wrong.
pub const FALSE_POSITIVE_ADJUSTMENT: f64 = -2.0;

/// A user correction to an earlier violation flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningEntry {
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub explanation: String,
    pub score_adjustment: f64,
    pub context: String,
}

impl LearningEntry {
    pub fn from_correction(
        category: &str,
        explanation: &str,
        was_correct: bool,
        context: &str,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            category: category.to_string(),
            explanation: explanation.to_string(),
            score_adjustment: correction_adjustment(was_correct),
            context: context.to_string(),
        }
    }

    /// Plain substring test against the action text. Short tags such as
    /// "test" will also hit unrelated actions that happen to contain them.
    pub fn applies_to(&self, action: &str) -> bool {
        action.contains(&self.context)
    }
}

pub fn correction_adjustment(was_correct: bool) -> f64 {
    if was_correct {
        0.0
    } else {
        FALSE_POSITIVE_ADJUSTMENT
    }
}

/// Sum of every applicable entry's adjustment, unbounded.
pub fn total_adjustment(action: &str, entries: &[LearningEntry]) -> f64 {
    entries
        .iter()
        .filter(|entry| entry.applies_to(action))
        .map(|entry| entry.score_adjustment)
        .sum()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryStats {
    pub total: usize,
    pub false_positives: usize,
    pub total_adjustment: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LearningStats {
    pub total_entries: usize,
    pub categories: BTreeMap<String, CategoryStats>,
}

impl LearningStats {
    pub fn from_entries(entries: &[LearningEntry]) -> Self {
        let mut categories: BTreeMap<String, CategoryStats> = BTreeMap::new();

        for entry in entries {
            let stats = categories.entry(entry.category.clone()).or_default();
            stats.total += 1;
            if entry.score_adjustment < 0.0 {
                stats.false_positives += 1;
            }
            stats.total_adjustment += entry.score_adjustment;
        }

        Self {
            total_entries: entries.len(),
            categories,
        }
    }
}

/// Most recent entries, newest first.
pub fn most_recent(entries: &[LearningEntry], limit: usize) -> Vec<&LearningEntry> {
    entries.iter().rev().take(limit).collect()
}
