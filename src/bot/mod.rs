//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Routes incoming messages through the wizard engine
//! - `dialogue_manager`: Sends replies and runs completed wizards through generation
//! - `ui_builder`: Creates keyboards and splits long messages

pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;

use crate::catalog::Flow;
use crate::db::AnalysisStore;
use crate::dialogue::WizardState;
use crate::pipeline::GenerationPipeline;

pub use message_handler::message_handler;

/// Shared services handed to every handler
pub struct BotContext {
    pub flow: &'static Flow,
    pub pipeline: GenerationPipeline,
    pub store: AnalysisStore,
}

/// Update handler tree: every message enters the per-chat wizard dialogue
pub fn schema() -> UpdateHandler<anyhow::Error> {
    Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<WizardState>, WizardState>()
        .endpoint(message_handler)
}
