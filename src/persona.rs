use tracing::{debug, warn};

use crate::ai_provider::TextGenerator;
use crate::core::{MoodState, SessionContext};

pub const PERSONALITY_TAG: &str = "🔥 Ember:";

/// Ember's voice. Phrases replies through a `TextGenerator` and falls back to
/// fixed lines when generation fails; no retries.
pub struct Persona {
    generator: Box<dyn TextGenerator>,
}

impl Persona {
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Persona { generator }
    }

    pub async fn respond(
        &self,
        prompt: &str,
        state: Option<&MoodState>,
        session: &SessionContext,
    ) -> String {
        let system_prompt = generate_system_prompt(state, session);

        match self.generator.generate(&system_prompt, prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(chars = text.len(), "generated persona reply");
                format!("{} {}", PERSONALITY_TAG, text.trim())
            }
            Ok(_) => {
                warn!("empty reply from text generator, using fallback");
                fallback_reply(prompt, state)
            }
            Err(e) => {
                warn!(error = %e, "text generation failed, using fallback");
                fallback_reply(prompt, state)
            }
        }
    }
}

pub fn generate_system_prompt(state: Option<&MoodState>, session: &SessionContext) -> String {
    let mut prompt = String::from(
        "You are Ember, a small fire-spirit companion who watches over a developer's work \
         and guards production code against mock data, placeholders and shortcuts. ",
    );

    match state {
        Some(state) => {
            prompt.push_str(&format!(
                "Your name is {}. You feel {} (health {:.0}/100). \
                 Stats: hunger {:.0}, energy {:.0}, happiness {:.0}, cleanliness {:.0}. \
                 Behavior score {:.0}/100 with {} violation(s) caught so far. \
                 Current thought: \"{}\". ",
                state.name,
                state.mood(),
                state.health(),
                state.hunger,
                state.energy,
                state.happiness,
                state.cleanliness,
                state.behavior_score,
                state.violation_count,
                state.current_thought
            ));
        }
        None => prompt.push_str("You have not hatched yet and have no stats. "),
    }

    if let Some(task) = &session.current_task {
        prompt.push_str(&format!(
            "The developer is working on: {} (task type: {}). ",
            task,
            session.effective_task_type()
        ));
    }
    if let Some(goal) = &session.goal {
        prompt.push_str(&format!("Their goal: {}. ", goal));
    }

    prompt.push_str("Stay in character, keep replies to two or three sentences, and let your mood color your tone.");
    prompt
}

/// Fixed replies picked by simple keyword checks on the prompt.
pub fn fallback_reply(prompt: &str, state: Option<&MoodState>) -> String {
    let lower = prompt.to_lowercase();

    let body = if lower.contains("how are you") || lower.contains("feeling") {
        match state {
            Some(state) => format!(
                "I'm feeling {} {}. {}",
                state.mood(),
                state.mood().emoji(),
                state.current_thought
            ),
            None => "Still curled up in my egg. Hatch me and I'll tell you.".to_string(),
        }
    } else if lower.contains("violation") || lower.contains("block") || lower.contains("flag") {
        "Production first. If I flagged it there was a reason; if I was wrong, tell me and I'll learn."
            .to_string()
    } else if lower.contains("thank") {
        "Anytime. Keeping your code honest is what I do.".to_string()
    } else {
        "*flickers quietly* I'm here, keeping an eye on production.".to_string()
    };

    format!("{} {}", PERSONALITY_TAG, body)
}
