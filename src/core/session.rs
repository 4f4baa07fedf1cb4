use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const MAX_RECENT_ACTIONS: usize = 20;

/// Hint describing the kind of work in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskType {
    Development,
    Testing,
    Monitoring,
    Refactoring,
    #[default]
    Unknown,
}

impl TaskType {
    /// Lenient parse: anything unrecognized is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "development" => TaskType::Development,
            "testing" => TaskType::Testing,
            "monitoring" => TaskType::Monitoring,
            "refactoring" => TaskType::Refactoring,
            _ => TaskType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Development => "development",
            TaskType::Testing => "testing",
            TaskType::Monitoring => "monitoring",
            TaskType::Refactoring => "refactoring",
            TaskType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for TaskType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TaskType::parse(&s))
    }
}

/// Fields supplied by a `feed_context` call. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextUpdate {
    pub task: Option<String>,
    pub task_type: Option<String>,
    pub goal: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default)]
    pub current_task: Option<String>,
    #[serde(default)]
    pub task_type: Option<TaskType>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default = "Utc::now")]
    pub session_start: DateTime<Utc>,
    #[serde(default)]
    pub recent_actions: Vec<String>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            current_task: None,
            task_type: None,
            goal: None,
            session_start: Utc::now(),
            recent_actions: Vec::new(),
        }
    }
}

impl SessionContext {
    pub fn effective_task_type(&self) -> TaskType {
        self.task_type.unwrap_or_default()
    }

    /// Merge a context update. A different task text opens a new session.
    pub fn merge(&mut self, update: ContextUpdate) {
        if let Some(task) = update.task {
            let task = task.trim().to_string();
            if self.current_task.as_deref() != Some(task.as_str()) {
                self.session_start = Utc::now();
                self.recent_actions.clear();
            }
            self.current_task = Some(task);
        }
        if let Some(task_type) = update.task_type {
            self.task_type = Some(TaskType::parse(&task_type));
        }
        if let Some(goal) = update.goal {
            self.goal = Some(goal);
        }
    }

    pub fn record_action(&mut self, action: &str) {
        self.recent_actions.push(action.to_string());
        if self.recent_actions.len() > MAX_RECENT_ACTIONS {
            let overflow = self.recent_actions.len() - MAX_RECENT_ACTIONS;
            self.recent_actions.drain(..overflow);
        }
    }
}
