pub mod error;
pub mod feedback;
pub mod learning;
pub mod mood;
pub mod pattern;
pub mod scorer;
pub mod session;
pub mod store;

pub use error::{EmberError, Result};
pub use feedback::{FeedbackEntry, FeedbackSummary, Timeframe};
pub use learning::{LearningEntry, LearningStats};
pub use mood::{CareAction, Mood, MoodState};
pub use pattern::{PatternTable, Severity, ViolationPattern};
pub use scorer::{ActionPayload, Tier, Violation, ViolationReport, ViolationScorer};
pub use session::{ContextUpdate, SessionContext, TaskType};
pub use store::StateStore;
