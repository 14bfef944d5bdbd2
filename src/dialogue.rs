//! Wizard dialogue module for handling conversation state with users.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::pipeline::GenerationResult;

/// Answers collected so far, in step order
///
/// Keys are appended one at a time as the wizard advances and are never
/// overwritten once written.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    entries: Vec<(String, String)>,
}

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an answer; returns `false` and keeps the first value if the
    /// step was already answered
    pub fn record(&mut self, step: &str, value: &str) -> bool {
        if self.get(step).is_some() {
            return false;
        }
        self.entries.push((step.to_string(), value.to_string()));
        true
    }

    pub fn get(&self, step: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == step)
            .map(|(_, value)| value.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON object view used for persistence
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
                .collect(),
        )
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for AnswerRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = AnswerRecord::new();
        for (key, value) in iter {
            record.record(key.as_ref(), value.as_ref());
        }
        record
    }
}

/// Represents the conversation state of one chat
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum WizardState {
    /// No wizard running
    #[default]
    Idle,
    /// Welcome menu shown, waiting for the user to begin
    AwaitingStart,
    /// Waiting for the answer to `step`
    Answering { step: String, answers: AnswerRecord },
    /// Help menu shown
    HelpMenu,
    /// A run finished; its result can be shown again
    Review { result: GenerationResult },
}

/// Type alias for our wizard dialogue
pub type WizardDialogue = Dialogue<WizardState, InMemStorage<WizardState>>;

/// Validates a wizard answer; the answer is kept exactly as sent
pub fn validate_answer(input: &str) -> Result<String, &'static str> {
    if input.trim().is_empty() {
        return Err("empty");
    }

    Ok(input.to_string())
}
