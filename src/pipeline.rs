//! # Generation Pipeline Module
//!
//! Two sequential model calls per completed wizard run:
//!
//! 1. **Draft**: the flow's draft template is filled with the collected
//!    answers and sent to the model, producing the primary artifact
//!    (a script or a list of ideas).
//! 2. **Critique**: the draft is embedded verbatim in the critique template;
//!    the response is split into the flow's supplementary sections.
//!
//! Any failure in either stage short-circuits to [`BotError::GenerationFailed`].
//! There is no retry and no partial result.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::catalog::{Flow, PromptTemplate};
use crate::dialogue::AnswerRecord;
use crate::errors::BotError;
use crate::generator::{GenerationRequest, TextGenerator};
use crate::sections::parse_sections;

/// Default output budget for each model call
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex =
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Placeholder pattern should be valid");
}

/// Structured output of one completed run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Identifier of the flow that produced this result
    pub flow: String,
    /// Raw multi-line text of the draft call
    pub primary: String,
    /// Supplementary sections keyed by field name
    pub fields: BTreeMap<String, Vec<String>>,
}

impl GenerationResult {
    /// A result with every field of `flow` present and empty
    pub fn empty(flow: &Flow) -> Self {
        Self {
            flow: flow.id.to_string(),
            primary: String::new(),
            fields: flow
                .sections
                .iter()
                .map(|section| (section.field.to_string(), Vec::new()))
                .collect(),
        }
    }

    /// Entries of a supplementary field; empty when the field is absent
    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether every supplementary field is empty
    pub fn supplements_empty(&self) -> bool {
        self.fields.values().all(Vec::is_empty)
    }

    /// JSON object view used for persistence, keyed the way the flow names
    /// its fields
    pub fn to_json(&self, flow: &Flow) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert(
            flow.primary.field.to_string(),
            serde_json::Value::String(self.primary.clone()),
        );
        for (field, entries) in &self.fields {
            object.insert(field.clone(), serde_json::json!(entries));
        }
        serde_json::Value::Object(object)
    }
}

/// Names of the `{placeholder}` fields referenced by a template, in order
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Substitute every `{placeholder}` in `template` using `lookup`
///
/// Values are inserted verbatim and are not themselves scanned for
/// placeholders.
pub fn fill_template<'a, F>(template: &str, lookup: F) -> Result<String, BotError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut output = String::with_capacity(template.len());
    let mut last_end = 0;

    for caps in PLACEHOLDER_REGEX.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let name = &caps[1];
        let value = lookup(name).ok_or_else(|| BotError::MissingField(name.to_string()))?;

        output.push_str(&template[last_end..whole.start()]);
        output.push_str(value);
        last_end = whole.end();
    }
    output.push_str(&template[last_end..]);

    Ok(output)
}

/// Runs the draft and critique calls for a completed answer record
#[derive(Clone)]
pub struct GenerationPipeline {
    generator: Arc<dyn TextGenerator>,
    max_tokens: u32,
}

impl GenerationPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, max_tokens: u32) -> Self {
        Self {
            generator,
            max_tokens,
        }
    }

    /// Produce a [`GenerationResult`] for `answers` using `flow`'s templates
    pub async fn run(
        &self,
        flow: &Flow,
        answers: &AnswerRecord,
    ) -> Result<GenerationResult, BotError> {
        info!(flow = %flow.id, answers = answers.len(), "Starting generation pipeline");

        let draft_prompt = fill_template(flow.draft.human, |name| answers.get(name))?;
        let draft = self.call_stage("draft", &flow.draft, draft_prompt).await?;

        let critique_prompt = fill_template(flow.critique.human, |name| {
            (name == flow.primary.field).then_some(draft.as_str())
        })?;
        let critique = self
            .call_stage("critique", &flow.critique, critique_prompt)
            .await?;

        let mut result = GenerationResult::empty(flow);
        result.primary = draft;
        for (field, entries) in parse_sections(&critique, &flow.title_map()) {
            debug!(field = %field, entries = entries.len(), "Parsed critique section");
            result.fields.insert(field, entries);
        }

        info!(
            flow = %flow.id,
            primary_chars = result.primary.chars().count(),
            empty_supplements = result.supplements_empty(),
            "Generation pipeline completed"
        );
        Ok(result)
    }

    async fn call_stage(
        &self,
        stage: &str,
        template: &PromptTemplate,
        prompt: String,
    ) -> Result<String, BotError> {
        let request = GenerationRequest {
            system: template.system.to_string(),
            prompt,
            max_tokens: self.max_tokens,
        };

        match self.generator.generate(request).await {
            Ok(Some(text)) if !text.trim().is_empty() => {
                info!(stage = %stage, response_chars = text.chars().count(), "Generation stage completed");
                Ok(text)
            }
            Ok(_) => {
                error!(stage = %stage, "Generation stage returned no text");
                Err(BotError::GenerationFailed(format!(
                    "{stage} stage returned an empty response"
                )))
            }
            Err(e) => {
                error!(stage = %stage, error = %e, "Generation stage failed");
                Err(BotError::GenerationFailed(format!("{stage} stage: {e}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_in_order() {
        assert_eq!(
            placeholders("{a} and {b_2} then {a}"),
            vec!["a".to_string(), "b_2".to_string(), "a".to_string()]
        );
        assert!(placeholders("[0:00-0:05] no fields").is_empty());
    }

    #[test]
    fn test_fill_template_substitutes_verbatim() {
        let filled = fill_template("주제: {topic}", |name| (name == "topic").then_some("{age}"))
            .unwrap();
        assert_eq!(filled, "주제: {age}");
    }

    #[test]
    fn test_fill_template_missing_field() {
        let err = fill_template("{topic} / {age}", |name| (name == "topic").then_some("x"))
            .unwrap_err();
        assert_eq!(err, BotError::MissingField("age".to_string()));
    }

    #[test]
    fn test_field_accessor_defaults_to_empty() {
        let result = GenerationResult::default();
        assert!(result.field("hooks").is_empty());
        assert!(result.supplements_empty());
    }
}
