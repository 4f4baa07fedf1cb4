use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::feedback::{FeedbackEntry, FeedbackSummary, Timeframe};
use crate::core::learning::{self, LearningEntry, LearningStats};
use crate::core::{
    ActionPayload, ContextUpdate, EmberError, MoodState, StateStore, Tier, ViolationScorer,
};
use crate::persona::Persona;

const RECENT_LEARNING: usize = 5;

/// Validates tool arguments and routes each call to the scorer, the store and
/// the persona. Owns all state; nothing is read from globals.
pub struct ToolDispatcher {
    store: StateStore,
    scorer: ViolationScorer,
    persona: Persona,
    pet_name: String,
    strict_mode: bool,
}

impl ToolDispatcher {
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            config.store(),
            Persona::new(config.text_generator()),
            &config.pet_name,
            config.strict_mode,
        )
    }

    pub fn with_parts(store: StateStore, persona: Persona, pet_name: &str, strict_mode: bool) -> Self {
        ToolDispatcher {
            store,
            scorer: ViolationScorer::default(),
            persona,
            pet_name: pet_name.to_string(),
            strict_mode,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub async fn execute_tool(&self, tool_name: &str, arguments: &Value) -> Value {
        debug!(tool = tool_name, "executing tool");

        let result = match tool_name {
            "check_violation" => self.tool_check_violation(arguments),
            "consult" => self.tool_consult(arguments).await,
            "chat" => self.tool_chat(arguments).await,
            "get_mood" => Ok(self.tool_get_mood().await),
            "get_feedback" => Ok(self.tool_get_feedback(arguments).await),
            "learn_from_outcome" => self.tool_learn_from_outcome(arguments).await,
            "feed_context" => self.tool_feed_context(arguments).await,
            "learn_from_correction" => self.tool_learn_from_correction(arguments),
            "get_learning_stats" => Ok(self.tool_get_learning_stats()),
            _ => Err(EmberError::InvalidInput(format!("Unknown tool: {}", tool_name))),
        };

        result.unwrap_or_else(|e| {
            warn!(tool = tool_name, error = %e, "tool call rejected");
            json!({
                "success": false,
                "error": e.to_string()
            })
        })
    }

    fn tool_check_violation(&self, arguments: &Value) -> Result<Value, EmberError> {
        let action = required_str(arguments, "action")?;
        let params = arguments
            .get("parameters")
            .or_else(|| arguments.get("params"))
            .cloned()
            .unwrap_or(Value::Null);
        let context = optional_str(arguments, "context").unwrap_or_default();
        let payload = ActionPayload::new(action, params, context);

        let mut session = self.store.load_session();
        let learning = self.store.load_learning();
        let report = self.scorer.check(&payload, &session, &learning)?;

        session.record_action(action);
        let mut persisted = persist(self.store.save_session(&session), "session context");

        if let (true, Some(primary)) = (report.is_flagged(), report.primary()) {
            warn!(
                action,
                category = %primary.category,
                score = report.max_score,
                blocked = report.block,
                "production-policy violation flagged"
            );
            let mut state = self.load_or_hatch();
            state.record_violation(report.tier, &primary.category);
            persisted &= persist(self.store.save_mood(&state), "pet state");
        }

        let should_proceed = match report.tier {
            Tier::Blocked => false,
            Tier::Warning => !self.strict_mode,
            Tier::Clean => true,
        };

        Ok(json!({
            "success": true,
            "has_violations": report.has_violations,
            "violations": report.violations,
            "max_score": report.max_score,
            "block": report.block,
            "tier": report.tier,
            "message": report.message,
            "should_proceed": should_proceed,
            "strict_mode": self.strict_mode,
            "persisted": persisted
        }))
    }

    async fn tool_consult(&self, arguments: &Value) -> Result<Value, EmberError> {
        let question = required_str(arguments, "question")?;
        let options: Vec<&str> = arguments["options"]
            .as_array()
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut prompt = format!("The developer asks for your advice: {}", question);
        if !options.is_empty() {
            prompt.push_str("\nOptions:");
            for (i, option) in options.iter().enumerate() {
                prompt.push_str(&format!("\n{}. {}", i + 1, option));
            }
        }
        if let Some(context) = optional_str(arguments, "context") {
            prompt.push_str(&format!("\nContext: {}", context));
        }
        prompt.push_str("\nRecommend one path and say why, favoring production-ready choices.");

        let recommendation = self.respond(&prompt).await;
        Ok(json!({
            "success": true,
            "recommendation": recommendation
        }))
    }

    async fn tool_chat(&self, arguments: &Value) -> Result<Value, EmberError> {
        let message = required_str(arguments, "message")?;
        let response = self.respond(message).await;
        Ok(json!({
            "success": true,
            "response": response
        }))
    }

    async fn tool_get_mood(&self) -> Value {
        let state = match self.store.load_mood() {
            Some(state) => state,
            None => {
                return json!({
                    "success": true,
                    "initialized": false,
                    "message": "🥚 Ember hasn't hatched yet. Report an outcome or run `ember init` to bring Ember to life."
                })
            }
        };

        let session = self.store.load_session();
        let description = self
            .persona
            .respond("How are you feeling right now?", Some(&state), &session)
            .await;

        json!({
            "success": true,
            "initialized": true,
            "state": mood_snapshot(&state),
            "description": description
        })
    }

    async fn tool_get_feedback(&self, arguments: &Value) -> Value {
        let timeframe = Timeframe::parse(optional_str(arguments, "timeframe").unwrap_or("recent"));
        let entries = self.store.load_feedback();
        let session = self.store.load_session();
        let selected = timeframe.select(&entries, session.session_start);
        let summary = FeedbackSummary::from_entries(selected);

        let mut prompt = format!(
            "Summarize how the developer's work has gone ({}): {} outcome(s), {:.0}% successful.",
            timeframe.as_str(),
            summary.count,
            summary.success_rate
        );
        for entry in selected.iter().rev().take(3) {
            prompt.push_str(&format!(
                "\n- {} ({})",
                entry.action,
                if entry.success { "succeeded" } else { "failed" }
            ));
        }

        let state = self.store.load_mood();
        let text = self.persona.respond(&prompt, state.as_ref(), &session).await;

        json!({
            "success": true,
            "timeframe": timeframe.as_str(),
            "count": summary.count,
            "successes": summary.successes,
            "success_rate": summary.success_rate,
            "average_quality": summary.average_quality,
            "summary": text
        })
    }

    async fn tool_learn_from_outcome(&self, arguments: &Value) -> Result<Value, EmberError> {
        let action = required_str(arguments, "action")?;
        let success = required_bool(arguments, "success")?;
        let outcome = required_str(arguments, "outcome")?;
        let quality_score = parse_quality_score(arguments)?;

        let mut state = self.load_or_hatch();
        state.apply_outcome(success, quality_score);

        let mut prompt = format!(
            "The developer reports that '{}' {}. Details: {}",
            action,
            if success { "succeeded" } else { "failed" },
            outcome
        );
        if let Some(q) = quality_score {
            prompt.push_str(&format!("\nQuality score: {}/100", q));
        }
        prompt.push_str("\nGive short, honest feedback.");

        let session = self.store.load_session();
        let feedback = self.persona.respond(&prompt, Some(&state), &session).await;

        let entry = FeedbackEntry::new(action, success, &feedback, quality_score);
        let mut persisted = persist(self.store.append_feedback(&entry), "feedback log");
        persisted &= persist(self.store.save_mood(&state), "pet state");

        Ok(json!({
            "success": true,
            "feedback": feedback,
            "mood": state.mood(),
            "persisted": persisted
        }))
    }

    async fn tool_feed_context(&self, arguments: &Value) -> Result<Value, EmberError> {
        let task = required_str(arguments, "task")?;

        let mut session = self.store.load_session();
        session.merge(ContextUpdate {
            task: Some(task.to_string()),
            task_type: optional_str(arguments, "task_type").map(|s| s.to_string()),
            goal: optional_str(arguments, "goal").map(|s| s.to_string()),
        });
        let persisted = persist(self.store.save_session(&session), "session context");

        let prompt = format!(
            "The developer is now working on: {} (task type: {}). Acknowledge briefly.",
            task,
            session.effective_task_type()
        );
        let state = self.store.load_mood();
        let acknowledgment = self.persona.respond(&prompt, state.as_ref(), &session).await;

        Ok(json!({
            "success": true,
            "session": session,
            "acknowledgment": acknowledgment,
            "persisted": persisted
        }))
    }

    fn tool_learn_from_correction(&self, arguments: &Value) -> Result<Value, EmberError> {
        let category = required_str(arguments, "violation_type")?;
        let explanation = optional_str(arguments, "user_explanation").unwrap_or_default();
        let was_correct = required_bool(arguments, "was_correct")?;
        let context = required_str(arguments, "context")?;

        if !self.scorer.table().contains_category(category) {
            return Err(EmberError::InvalidInput(format!(
                "unknown violation_type '{}', expected one of: {}",
                category,
                self.scorer.table().categories().join(", ")
            )));
        }

        let entry = LearningEntry::from_correction(category, explanation, was_correct, context);
        let persisted = persist(self.store.append_learning(&entry), "learning log");
        info!(category, context, adjustment = entry.score_adjustment, "recorded correction");

        let message = if was_correct {
            format!("Thanks for confirming. I'll keep flagging {} the same way.", category)
        } else {
            format!(
                "Got it. Future {} flags on actions containing '{}' will score {:.1} lower.",
                category,
                context,
                -entry.score_adjustment
            )
        };

        Ok(json!({
            "success": true,
            "category": category,
            "score_adjustment": entry.score_adjustment,
            "context": context,
            "message": message,
            "persisted": persisted
        }))
    }

    fn tool_get_learning_stats(&self) -> Value {
        let entries = self.store.load_learning();
        let stats = LearningStats::from_entries(&entries);
        let recent = learning::most_recent(&entries, RECENT_LEARNING);

        json!({
            "success": true,
            "total_entries": stats.total_entries,
            "categories": stats.categories,
            "session": self.store.load_session(),
            "recent": recent
        })
    }

    async fn respond(&self, prompt: &str) -> String {
        let state = self.store.load_mood();
        let session = self.store.load_session();
        self.persona.respond(prompt, state.as_ref(), &session).await
    }

    fn load_or_hatch(&self) -> MoodState {
        self.store.load_mood().unwrap_or_else(|| {
            info!(name = %self.pet_name, "hatching new pet");
            MoodState::new(&self.pet_name)
        })
    }
}

pub fn mood_snapshot(state: &MoodState) -> Value {
    json!({
        "name": state.name,
        "mood": state.mood(),
        "health": state.health(),
        "hunger": state.hunger,
        "energy": state.energy,
        "happiness": state.happiness,
        "cleanliness": state.cleanliness,
        "behavior_score": state.behavior_score,
        "violation_count": state.violation_count,
        "current_thought": state.current_thought,
        "thoughts": state.thoughts,
        "last_updated": state.last_updated
    })
}

fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, EmberError> {
    arguments[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EmberError::InvalidInput(format!("'{}' is required", key)))
}

fn optional_str<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
    arguments[key].as_str()
}

fn required_bool(arguments: &Value, key: &str) -> Result<bool, EmberError> {
    arguments[key]
        .as_bool()
        .ok_or_else(|| EmberError::InvalidInput(format!("'{}' must be a boolean", key)))
}

/// Optional 0-100 score. Fractions round to the nearest integer and values
/// above 100 are capped; negatives and non-numbers are rejected.
fn parse_quality_score(arguments: &Value) -> Result<Option<u8>, EmberError> {
    let value = &arguments["quality_score"];
    if value.is_null() {
        return Ok(None);
    }

    match value.as_f64() {
        Some(q) if q >= 0.0 => Ok(Some(q.round().min(100.0) as u8)),
        _ => Err(EmberError::InvalidInput(format!(
            "'quality_score' must be a number between 0 and 100, got {}",
            value
        ))),
    }
}

fn persist(result: crate::core::Result<()>, what: &str) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "failed to persist {}, continuing without it", what);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai_provider::CannedGenerator;
    use crate::persona::PERSONALITY_TAG;

    fn dispatcher(dir: &tempfile::TempDir, strict_mode: bool) -> ToolDispatcher {
        ToolDispatcher::with_parts(
            StateStore::new(dir.path().to_path_buf()),
            Persona::new(Box::new(CannedGenerator::failing())),
            "Ember",
            strict_mode,
        )
    }

    fn mock_check() -> Value {
        json!({
            "action": "write_file",
            "parameters": {"content": "const mockData = [1,2,3]"},
            "context": "dashboard"
        })
    }

    #[tokio::test]
    async fn test_check_violation_blocks_mock_data() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        let result = dispatcher.execute_tool("check_violation", &mock_check()).await;
        assert_eq!(result["success"], true);
        assert_eq!(result["block"], true);
        assert_eq!(result["tier"], "blocked");
        assert_eq!(result["max_score"], 8.0);
        assert_eq!(result["violations"][0]["category"], "mock_data");
        assert_eq!(result["should_proceed"], false);
        assert_eq!(result["persisted"], true);

        let state = dispatcher.store().load_mood().unwrap();
        assert_eq!(state.violation_count, 1);
        assert_eq!(
            dispatcher.store().load_session().recent_actions,
            vec!["write_file".to_string()]
        );
    }

    #[tokio::test]
    async fn test_testing_context_downgrades_to_warning() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        dispatcher
            .execute_tool("feed_context", &json!({"task": "write tests", "task_type": "testing"}))
            .await;
        let result = dispatcher.execute_tool("check_violation", &mock_check()).await;

        assert_eq!(result["max_score"], 6.5);
        assert_eq!(result["block"], false);
        assert_eq!(result["tier"], "warning");
        assert_eq!(result["should_proceed"], true);
    }

    #[tokio::test]
    async fn test_strict_mode_stops_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, true);

        dispatcher
            .execute_tool("feed_context", &json!({"task": "probe", "task_type": "monitoring"}))
            .await;
        let result = dispatcher.execute_tool("check_violation", &mock_check()).await;

        assert_eq!(result["block"], false);
        assert_eq!(result["should_proceed"], false);
    }

    #[tokio::test]
    async fn test_clean_check_leaves_pet_unhatched() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        let result = dispatcher
            .execute_tool(
                "check_violation",
                &json!({
                    "action": "write_file",
                    "parameters": {"content": "const apiData = await fetch('/api/x')"}
                }),
            )
            .await;
        assert_eq!(result["has_violations"], false);
        assert_eq!(result["max_score"], 0.0);
        assert!(dispatcher.store().load_mood().is_none());
    }

    #[tokio::test]
    async fn test_check_violation_requires_action() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        let result = dispatcher
            .execute_tool("check_violation", &json!({"parameters": null}))
            .await;
        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().unwrap().contains("action"));
    }

    #[tokio::test]
    async fn test_double_quoted_secret_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        let result = dispatcher
            .execute_tool(
                "check_violation",
                &json!({
                    "action": "write_file",
                    "parameters": {"content": "const password = \"hunter22\""}
                }),
            )
            .await;
        assert_eq!(result["has_violations"], true);
        assert_eq!(result["violations"][0]["category"], "hardcoded_credentials");
        assert_eq!(result["max_score"], 7.5);
        assert_eq!(result["should_proceed"], true);
    }

    #[tokio::test]
    async fn test_correction_lowers_future_scores() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        let result = dispatcher
            .execute_tool(
                "learn_from_correction",
                &json!({
                    "violation_type": "mock_data",
                    "user_explanation": "writing test fixtures is fine",
                    "was_correct": false,
                    "context": "write_file"
                }),
            )
            .await;
        assert_eq!(result["success"], true);
        assert_eq!(result["score_adjustment"], -2.0);

        let result = dispatcher.execute_tool("check_violation", &mock_check()).await;
        assert_eq!(result["max_score"], 6.0);
        assert_eq!(result["block"], false);
    }

    #[tokio::test]
    async fn test_confirmed_correction_has_no_adjustment() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        let result = dispatcher
            .execute_tool(
                "learn_from_correction",
                &json!({
                    "violation_type": "mock_data",
                    "user_explanation": "good catch",
                    "was_correct": true,
                    "context": "write_file"
                }),
            )
            .await;
        assert_eq!(result["score_adjustment"], 0.0);
    }

    #[tokio::test]
    async fn test_correction_rejects_unknown_category() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        let result = dispatcher
            .execute_tool(
                "learn_from_correction",
                &json!({
                    "violation_type": "style",
                    "user_explanation": "",
                    "was_correct": false,
                    "context": "x"
                }),
            )
            .await;
        assert_eq!(result["success"], false);
        assert!(dispatcher.store().load_learning().is_empty());
    }

    #[tokio::test]
    async fn test_get_mood_uninitialized_then_hatched() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        let result = dispatcher.execute_tool("get_mood", &json!({})).await;
        assert_eq!(result["initialized"], false);

        dispatcher
            .execute_tool(
                "learn_from_outcome",
                &json!({"action": "deploy", "success": true, "outcome": "green", "quality_score": 90}),
            )
            .await;

        let result = dispatcher.execute_tool("get_mood", &json!({})).await;
        assert_eq!(result["initialized"], true);
        assert_eq!(result["state"]["name"], "Ember");
        assert_eq!(result["state"]["happiness"], 68.0);
        assert!(result["description"]
            .as_str()
            .unwrap()
            .starts_with(PERSONALITY_TAG));
    }

    #[tokio::test]
    async fn test_feedback_over_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        let result = dispatcher
            .execute_tool("get_feedback", &json!({"timeframe": "session"}))
            .await;
        assert_eq!(result["success"], true);
        assert_eq!(result["count"], 0);
        assert_eq!(result["success_rate"], 0.0);
    }

    #[tokio::test]
    async fn test_outcomes_feed_the_summary() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        for success in [true, false, true, true] {
            let result = dispatcher
                .execute_tool(
                    "learn_from_outcome",
                    &json!({"action": "run_tests", "success": success, "outcome": "done"}),
                )
                .await;
            assert_eq!(result["persisted"], true);
        }

        let result = dispatcher
            .execute_tool("get_feedback", &json!({"timeframe": "recent"}))
            .await;
        assert_eq!(result["count"], 4);
        assert_eq!(result["success_rate"], 75.0);

        let result = dispatcher
            .execute_tool("get_feedback", &json!({"timeframe": "last_action"}))
            .await;
        assert_eq!(result["count"], 1);
    }

    #[tokio::test]
    async fn test_outcome_requires_success_flag() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        let result = dispatcher
            .execute_tool("learn_from_outcome", &json!({"action": "deploy", "outcome": "?"}))
            .await;
        assert_eq!(result["success"], false);
    }

    #[tokio::test]
    async fn test_outcome_requires_outcome_text() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        let result = dispatcher
            .execute_tool("learn_from_outcome", &json!({"action": "deploy", "success": true}))
            .await;
        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().unwrap().contains("outcome"));
        assert!(dispatcher.store().load_feedback().is_empty());
        assert!(dispatcher.store().load_mood().is_none());
    }

    #[tokio::test]
    async fn test_quality_score_accepts_floats_and_caps() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        for quality in [json!(85.4), json!(250)] {
            let result = dispatcher
                .execute_tool(
                    "learn_from_outcome",
                    &json!({"action": "deploy", "success": true, "outcome": "ok", "quality_score": quality}),
                )
                .await;
            assert_eq!(result["success"], true);
        }

        let qualities: Vec<Option<u8>> = dispatcher
            .store()
            .load_feedback()
            .iter()
            .map(|entry| entry.quality_score)
            .collect();
        assert_eq!(qualities, vec![Some(85), Some(100)]);
    }

    #[tokio::test]
    async fn test_quality_score_rejects_negative_and_text() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        for quality in [json!(-5), json!("high")] {
            let result = dispatcher
                .execute_tool(
                    "learn_from_outcome",
                    &json!({"action": "deploy", "success": true, "outcome": "ok", "quality_score": quality}),
                )
                .await;
            assert_eq!(result["success"], false);
            assert!(result["error"].as_str().unwrap().contains("quality_score"));
        }
        assert!(dispatcher.store().load_feedback().is_empty());
    }

    #[tokio::test]
    async fn test_learning_stats() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);

        for (category, correct) in [("mock_data", false), ("mock_data", true), ("debug_output", false)] {
            dispatcher
                .execute_tool(
                    "learn_from_correction",
                    &json!({
                        "violation_type": category,
                        "user_explanation": "because",
                        "was_correct": correct,
                        "context": "fixtures"
                    }),
                )
                .await;
        }

        let result = dispatcher.execute_tool("get_learning_stats", &json!({})).await;
        assert_eq!(result["total_entries"], 3);
        assert_eq!(result["categories"]["mock_data"]["total"], 2);
        assert_eq!(result["categories"]["mock_data"]["total_adjustment"], -2.0);
        assert_eq!(result["recent"][0]["category"], "debug_output");
    }

    #[tokio::test]
    async fn test_write_failure_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();

        let dispatcher = ToolDispatcher::with_parts(
            StateStore::new(blocker.join("ember")),
            Persona::new(Box::new(CannedGenerator::failing())),
            "Ember",
            false,
        );

        let result = dispatcher.execute_tool("check_violation", &mock_check()).await;
        assert_eq!(result["success"], true);
        assert_eq!(result["block"], true);
        assert_eq!(result["persisted"], false);
    }

    #[tokio::test]
    async fn test_chat_and_consult_use_persona() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = ToolDispatcher::with_parts(
            StateStore::new(dir.path().to_path_buf()),
            Persona::new(Box::new(CannedGenerator::reply("Go with option 2."))),
            "Ember",
            false,
        );

        let result = dispatcher
            .execute_tool(
                "consult",
                &json!({"question": "Which store?", "options": ["sqlite", "postgres"]}),
            )
            .await;
        assert_eq!(result["recommendation"], "🔥 Ember: Go with option 2.");

        let result = dispatcher.execute_tool("chat", &json!({"message": "hi"})).await;
        assert_eq!(result["response"], "🔥 Ember: Go with option 2.");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, false);
        let result = dispatcher.execute_tool("teleport", &json!({})).await;
        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().unwrap().contains("teleport"));
    }
}
