use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scorer::Tier;

pub const DEFAULT_STAT: f64 = 60.0;
pub const MAX_THOUGHTS: usize = 10;

/// Mood label, a step function of health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Exhausted,
    Tired,
    Okay,
    Content,
    Happy,
}

impl Mood {
    pub fn from_health(health: f64) -> Self {
        if health < 30.0 {
            Mood::Exhausted
        } else if health < 50.0 {
            Mood::Tired
        } else if health < 70.0 {
            Mood::Okay
        } else if health < 85.0 {
            Mood::Content
        } else {
            Mood::Happy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Exhausted => "exhausted",
            Mood::Tired => "tired",
            Mood::Okay => "okay",
            Mood::Content => "content",
            Mood::Happy => "happy",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Exhausted => "🪫",
            Mood::Tired => "😮‍💨",
            Mood::Okay => "🙂",
            Mood::Content => "😊",
            Mood::Happy => "🔥",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pet-care actions available from the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareAction {
    Feed,
    Rest,
    Clean,
    Play,
}

impl std::str::FromStr for CareAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feed" => Ok(CareAction::Feed),
            "rest" => Ok(CareAction::Rest),
            "clean" => Ok(CareAction::Clean),
            "play" => Ok(CareAction::Play),
            _ => Err(format!("unknown care action: {}", s)),
        }
    }
}

/// Ember's simulated well-being.
///
/// The four stats are meant to stay within 0-100 but nothing enforces that on
/// disk; readers clamp before deriving health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodState {
    pub name: String,
    pub hunger: f64,
    pub energy: f64,
    pub happiness: f64,
    pub cleanliness: f64,
    pub behavior_score: f64,
    pub violation_count: u32,
    #[serde(default)]
    pub thoughts: Vec<String>,
    pub current_thought: String,
    pub last_updated: DateTime<Utc>,
}

impl MoodState {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            hunger: DEFAULT_STAT,
            energy: DEFAULT_STAT,
            happiness: DEFAULT_STAT,
            cleanliness: DEFAULT_STAT,
            behavior_score: 100.0,
            violation_count: 0,
            thoughts: Vec::new(),
            current_thought: "Ready to keep things production-ready.".to_string(),
            last_updated: Utc::now(),
        }
    }

    /// Mean of the four stats, each clamped to 0-100.
    pub fn health(&self) -> f64 {
        let stats = [self.hunger, self.energy, self.happiness, self.cleanliness];
        stats.iter().map(|s| clamp_stat(*s)).sum::<f64>() / stats.len() as f64
    }

    pub fn mood(&self) -> Mood {
        Mood::from_health(self.health())
    }

    pub fn think(&mut self, thought: impl Into<String>) {
        let previous = std::mem::replace(&mut self.current_thought, thought.into());
        self.thoughts.push(previous);
        if self.thoughts.len() > MAX_THOUGHTS {
            let overflow = self.thoughts.len() - MAX_THOUGHTS;
            self.thoughts.drain(..overflow);
        }
        self.last_updated = Utc::now();
    }

    /// React to a flagged check. Clean-tier results leave the state alone.
    pub fn record_violation(&mut self, tier: Tier, category: &str) {
        let penalty = match tier {
            Tier::Blocked => 10.0,
            Tier::Warning => 5.0,
            Tier::Clean => return,
        };

        self.violation_count += 1;
        self.behavior_score = clamp_stat(self.behavior_score - penalty);
        self.happiness = clamp_stat(self.happiness - 5.0);

        let thought = match tier {
            Tier::Blocked => format!("Stopped a {} violation. That was close.", category),
            _ => format!("Keeping an eye on that {} warning.", category),
        };
        self.think(thought);
    }

    pub fn apply_outcome(&mut self, success: bool, quality_score: Option<u8>) {
        if success {
            self.happiness += 5.0;
            self.behavior_score += 2.0;
        } else {
            self.happiness -= 5.0;
        }

        match quality_score {
            Some(q) if q >= 80 => self.happiness += 3.0,
            Some(q) if q < 40 => self.happiness -= 3.0,
            _ => {}
        }

        self.energy -= 3.0;
        self.hunger -= 2.0;
        self.clamp_all();

        let thought = if success {
            "That went well. More of that, please."
        } else {
            "That one stung. Let's figure out what went wrong."
        };
        self.think(thought);
    }

    pub fn care(&mut self, action: CareAction) {
        let thought = match action {
            CareAction::Feed => {
                self.hunger += 25.0;
                "Mmm, fuel for the fire."
            }
            CareAction::Rest => {
                self.energy += 30.0;
                "A quick nap. Back on watch."
            }
            CareAction::Clean => {
                self.cleanliness += 30.0;
                "Sparkling, like a clean diff."
            }
            CareAction::Play => {
                self.happiness += 20.0;
                self.energy -= 10.0;
                "That was fun!"
            }
        };
        self.clamp_all();
        self.think(thought);
    }

    fn clamp_all(&mut self) {
        self.hunger = clamp_stat(self.hunger);
        self.energy = clamp_stat(self.energy);
        self.happiness = clamp_stat(self.happiness);
        self.cleanliness = clamp_stat(self.cleanliness);
        self.behavior_score = clamp_stat(self.behavior_score);
    }
}

fn clamp_stat(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_stats(stats: [f64; 4]) -> MoodState {
        let mut state = MoodState::new("Ember");
        state.hunger = stats[0];
        state.energy = stats[1];
        state.happiness = stats[2];
        state.cleanliness = stats[3];
        state
    }

    #[test]
    fn test_new_state() {
        let state = MoodState::new("Ember");
        assert_eq!(state.name, "Ember");
        assert_eq!(state.health(), 60.0);
        assert_eq!(state.mood(), Mood::Okay);
        assert_eq!(state.violation_count, 0);
        assert!(state.thoughts.is_empty());
    }

    #[test]
    fn test_mood_bands() {
        assert_eq!(Mood::from_health(29.0), Mood::Exhausted);
        assert_eq!(Mood::from_health(30.0), Mood::Tired);
        assert_eq!(Mood::from_health(49.9), Mood::Tired);
        assert_eq!(Mood::from_health(50.0), Mood::Okay);
        assert_eq!(Mood::from_health(70.0), Mood::Content);
        assert_eq!(Mood::from_health(72.0), Mood::Content);
        assert_eq!(Mood::from_health(84.9), Mood::Content);
        assert_eq!(Mood::from_health(85.0), Mood::Happy);
    }

    #[test]
    fn test_health_is_mean() {
        let state = with_stats([80.0, 70.0, 60.0, 78.0]);
        assert_eq!(state.health(), 72.0);
        assert_eq!(state.mood(), Mood::Content);

        let state = with_stats([29.0, 29.0, 29.0, 29.0]);
        assert_eq!(state.mood(), Mood::Exhausted);

        let state = with_stats([85.0, 85.0, 85.0, 85.0]);
        assert_eq!(state.mood(), Mood::Happy);
    }

    #[test]
    fn test_health_clamps_out_of_range_stats() {
        let state = with_stats([250.0, -40.0, 100.0, 100.0]);
        assert_eq!(state.health(), 75.0);
    }

    #[test]
    fn test_record_violation() {
        let mut state = MoodState::new("Ember");
        state.record_violation(Tier::Blocked, "mock_data");
        assert_eq!(state.violation_count, 1);
        assert_eq!(state.behavior_score, 90.0);
        assert_eq!(state.happiness, 55.0);
        assert!(state.current_thought.contains("mock_data"));

        state.record_violation(Tier::Warning, "test_data");
        assert_eq!(state.violation_count, 2);
        assert_eq!(state.behavior_score, 85.0);

        state.record_violation(Tier::Clean, "debug_output");
        assert_eq!(state.violation_count, 2);
    }

    #[test]
    fn test_apply_outcome() {
        let mut state = MoodState::new("Ember");
        state.behavior_score = 99.0;
        state.apply_outcome(true, Some(95));
        assert_eq!(state.happiness, 68.0);
        assert_eq!(state.behavior_score, 100.0);
        assert_eq!(state.energy, 57.0);
        assert_eq!(state.hunger, 58.0);

        state.apply_outcome(false, Some(10));
        assert_eq!(state.happiness, 60.0);
    }

    #[test]
    fn test_care_clamps() {
        let mut state = MoodState::new("Ember");
        state.care(CareAction::Feed);
        state.care(CareAction::Feed);
        assert_eq!(state.hunger, 100.0);

        state.energy = 5.0;
        state.care(CareAction::Play);
        assert_eq!(state.energy, 0.0);
        assert_eq!(state.happiness, 80.0);
    }

    #[test]
    fn test_thought_history_is_bounded() {
        let mut state = MoodState::new("Ember");
        for i in 0..(MAX_THOUGHTS + 3) {
            state.think(format!("thought {}", i));
        }
        assert_eq!(state.thoughts.len(), MAX_THOUGHTS);
        assert_eq!(state.current_thought, format!("thought {}", MAX_THOUGHTS + 2));
        assert_eq!(state.thoughts.last().unwrap(), &format!("thought {}", MAX_THOUGHTS + 1));
    }

    #[test]
    fn test_care_action_parse() {
        assert_eq!("feed".parse::<CareAction>(), Ok(CareAction::Feed));
        assert_eq!("Clean".parse::<CareAction>(), Ok(CareAction::Clean));
        assert!("dance".parse::<CareAction>().is_err());
    }
}
