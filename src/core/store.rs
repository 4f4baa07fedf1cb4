use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::error::Result;
use super::feedback::FeedbackEntry;
use super::learning::LearningEntry;
use super::mood::MoodState;
use super::session::SessionContext;

const PET_STATE_FILE: &str = "pet_state.json";
const SESSION_FILE: &str = "session_context.json";
const FEEDBACK_LOG: &str = "feedback.jsonl";
const LEARNING_LOG: &str = "learning.jsonl";

/// File-backed storage: two whole-record JSON files and two append-only
/// JSON Lines logs. No locking; last write wins.
#[derive(Debug, Clone)]
pub struct StateStore {
    data_dir: PathBuf,
}

impl StateStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// `None` when no pet has been hatched or the record is unreadable.
    pub fn load_mood(&self) -> Option<MoodState> {
        self.read_record(PET_STATE_FILE)
    }

    pub fn save_mood(&self, state: &MoodState) -> Result<()> {
        self.write_record(PET_STATE_FILE, state)
    }

    pub fn load_session(&self) -> SessionContext {
        self.read_record(SESSION_FILE).unwrap_or_default()
    }

    pub fn save_session(&self, session: &SessionContext) -> Result<()> {
        self.write_record(SESSION_FILE, session)
    }

    pub fn append_feedback(&self, entry: &FeedbackEntry) -> Result<()> {
        self.append_line(FEEDBACK_LOG, entry)
    }

    pub fn load_feedback(&self) -> Vec<FeedbackEntry> {
        self.read_lines(FEEDBACK_LOG)
    }

    pub fn append_learning(&self, entry: &LearningEntry) -> Result<()> {
        self.append_line(LEARNING_LOG, entry)
    }

    pub fn load_learning(&self) -> Vec<LearningEntry> {
        self.read_lines(LEARNING_LOG)
    }

    fn read_record<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        let path = self.data_dir.join(file);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "record not found");
                return None;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read record");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupted record, treating as empty");
                None
            }
        }
    }

    fn write_record<T: Serialize>(&self, file: &str, record: &T) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let content = serde_json::to_string_pretty(record)?;
        fs::write(self.data_dir.join(file), content)?;
        Ok(())
    }

    fn append_line<T: Serialize>(&self, file: &str, record: &T) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let line = serde_json::to_string(record)?;
        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.data_dir.join(file))?;
        writeln!(log, "{}", line)?;
        Ok(())
    }

    fn read_lines<T: DeserializeOwned>(&self, file: &str) -> Vec<T> {
        let path = self.data_dir.join(file);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "failed to read log");
                }
                return Vec::new();
            }
        };

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(n, line)| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(path = %path.display(), line = n + 1, error = %e, "skipping unparsable log line");
                    None
                }
            })
            .collect()
    }
}
