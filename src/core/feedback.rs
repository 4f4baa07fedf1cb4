use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RECENT_WINDOW: usize = 10;

/// One reported outcome and Ember's reaction to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub success: bool,
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<u8>,
}

impl FeedbackEntry {
    pub fn new(action: &str, success: bool, feedback: &str, quality_score: Option<u8>) -> Self {
        Self {
            timestamp: Utc::now(),
            action: action.to_string(),
            success,
            feedback: feedback.to_string(),
            quality_score: quality_score.map(|q| q.min(100)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    LastAction,
    Session,
    Recent,
}

impl Timeframe {
    /// Unrecognized tags fall back to `Recent`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "last_action" => Timeframe::LastAction,
            "session" => Timeframe::Session,
            _ => Timeframe::Recent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::LastAction => "last_action",
            Timeframe::Session => "session",
            Timeframe::Recent => "recent",
        }
    }

    pub fn select<'a>(
        &self,
        entries: &'a [FeedbackEntry],
        session_start: DateTime<Utc>,
    ) -> &'a [FeedbackEntry] {
        match self {
            Timeframe::LastAction => &entries[entries.len().saturating_sub(1)..],
            Timeframe::Recent => &entries[entries.len().saturating_sub(RECENT_WINDOW)..],
            Timeframe::Session => {
                let first = entries
                    .iter()
                    .position(|e| e.timestamp >= session_start)
                    .unwrap_or(entries.len());
                &entries[first..]
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackSummary {
    pub count: usize,
    pub successes: usize,
    /// Percentage, 0 for an empty selection
    pub success_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_quality: Option<f64>,
}

impl FeedbackSummary {
    pub fn from_entries(entries: &[FeedbackEntry]) -> Self {
        let count = entries.len();
        let successes = entries.iter().filter(|e| e.success).count();
        let success_rate = if count == 0 {
            0.0
        } else {
            successes as f64 / count as f64 * 100.0
        };

        let qualities: Vec<f64> = entries
            .iter()
            .filter_map(|e| e.quality_score.map(f64::from))
            .collect();
        let average_quality = if qualities.is_empty() {
            None
        } else {
            Some(qualities.iter().sum::<f64>() / qualities.len() as f64)
        };

        Self {
            count,
            successes,
            success_rate,
            average_quality,
        }
    }
}
