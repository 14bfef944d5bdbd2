//! # Bot Error Types Module
//!
//! This module defines the error taxonomy shared by the wizard, the generation
//! pipeline and the persistence layer. Every variant is converted into a fixed,
//! user-visible message at the boundary of the step or stage where it occurs.

/// Custom error types for wizard and generation operations
#[derive(Debug, Clone, PartialEq)]
pub enum BotError {
    /// User input did not match what the current step expects
    InputIgnored,
    /// A prompt template references a field the answer record does not contain
    MissingField(String),
    /// A generation stage raised, or returned an empty response
    GenerationFailed(String),
    /// The analysis record could not be written
    PersistenceFailed(String),
    /// A step referenced a result that was never produced
    ResultMissing,
}

impl BotError {
    /// Localization key of the fixed message shown to the user for this error
    pub fn user_message_key(&self) -> &'static str {
        match self {
            BotError::InputIgnored => "error-input-ignored",
            BotError::MissingField(_) | BotError::GenerationFailed(_) => "error-generation-failed",
            BotError::PersistenceFailed(_) => "error-persistence-failed",
            BotError::ResultMissing => "error-result-missing",
        }
    }
}

impl std::fmt::Display for BotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotError::InputIgnored => write!(f, "Input ignored"),
            BotError::MissingField(field) => write!(f, "Missing template field: {field}"),
            BotError::GenerationFailed(msg) => write!(f, "Generation failed: {msg}"),
            BotError::PersistenceFailed(msg) => write!(f, "Persistence failed: {msg}"),
            BotError::ResultMissing => write!(f, "Result missing"),
        }
    }
}

impl std::error::Error for BotError {}
