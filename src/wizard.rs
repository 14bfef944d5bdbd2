//! # Wizard Engine Module
//!
//! Drives one chat through a flow's linear chain of questions. The engine is
//! transport-free: it takes the current [`WizardState`] and the user's input
//! and returns the next state, the replies to send, and whether the
//! generation pipeline must run. The bot layer turns replies into Telegram
//! messages and keyboards.
//!
//! `/start`, `/help` and `/cancel` are recognized at every state and
//! re-route the chat regardless of where it is in the chain.

use tracing::{debug, warn};

use crate::catalog::{
    Flow, StepDefinition, CUSTOM_INPUT_LABEL, GUIDE_LABEL, GUIDE_URL, HELP_LINKS,
    REPLAY_RESULT_LABEL, START_LABEL, START_MENU,
};
use crate::dialogue::{validate_answer, AnswerRecord, WizardState};
use crate::errors::BotError;
use crate::localization::{t_args_lang, t_lang};
use crate::render::render;

/// Image sent with the welcome message when available
pub const WELCOME_IMAGE_URL: &str =
    "https://imagedelivery.net/csS3I11UbX4B6HoDdrP-iA/051ec1a7-9cff-4ad1-8c4b-9a55a0173700/public";

/// Global commands recognized at any step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Cancel,
}

impl Command {
    /// Parse `/start`, `/help` or `/cancel`, tolerating a `@botname` suffix
    /// and trailing arguments
    pub fn parse(text: &str) -> Option<Command> {
        let token = text.split_whitespace().next()?;
        let name = token.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "cancel" => Some(Command::Cancel),
            _ => None,
        }
    }
}

/// A URL button attached under a message
#[derive(Debug, Clone, PartialEq)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

/// Keyboard attached to a reply
#[derive(Debug, Clone, PartialEq)]
pub enum Markup {
    /// Leave whatever keyboard the user currently has
    Keep,
    /// Show a reply keyboard of fixed labels
    Menu(Vec<Vec<String>>),
    /// Remove the reply keyboard so free text can be typed
    RemoveMenu,
    /// Inline URL buttons
    Links(Vec<Vec<LinkButton>>),
}

impl Markup {
    pub fn menu(rows: &[&[&str]]) -> Self {
        Markup::Menu(
            rows.iter()
                .map(|row| row.iter().map(|label| label.to_string()).collect())
                .collect(),
        )
    }

    pub fn link(label: String, url: &str) -> Self {
        Markup::Links(vec![vec![LinkButton {
            label,
            url: url.to_string(),
        }]])
    }
}

/// One outgoing message
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub markup: Markup,
    /// Photo to send with `text` as its caption
    pub image_url: Option<&'static str>,
}

impl Reply {
    pub fn new(text: String, markup: Markup) -> Self {
        Self {
            text,
            markup,
            image_url: None,
        }
    }
}

/// Work the caller must do after sending the replies
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The terminal step was answered; run the pipeline on these answers
    Generate(AnswerRecord),
}

/// Result of handling one input
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub state: WizardState,
    pub replies: Vec<Reply>,
    pub action: Option<Action>,
}

impl Outcome {
    fn reply(state: WizardState, reply: Reply) -> Self {
        Self {
            state,
            replies: vec![reply],
            action: None,
        }
    }
}

/// The question to show for the next step
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub step: &'static StepDefinition,
    pub text: String,
    pub options: Option<&'static [&'static [&'static str]]>,
}

/// Result of recording one answer
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Next(Prompt),
    Complete,
}

/// Drives a chat through one flow
#[derive(Debug, Clone, Copy)]
pub struct WizardEngine<'f> {
    flow: &'f Flow,
}

impl<'f> WizardEngine<'f> {
    pub fn new(flow: &'f Flow) -> Self {
        Self { flow }
    }

    pub fn flow(&self) -> &'f Flow {
        self.flow
    }

    /// Record `input` under `current` and move to its successor
    pub fn advance(
        &self,
        answers: &mut AnswerRecord,
        current: &StepDefinition,
        input: &str,
        language_code: Option<&str>,
    ) -> Advance {
        if !answers.record(current.id, input) {
            warn!(step = %current.id, "Step already answered; keeping the first answer");
        }

        match current.next.and_then(|next| self.flow.step(next)) {
            Some(next) => Advance::Next(self.prompt(next, language_code)),
            None => Advance::Complete,
        }
    }

    /// Question text and menu for `step`
    pub fn prompt(&self, step: &'static StepDefinition, language_code: Option<&str>) -> Prompt {
        Prompt {
            step,
            text: t_lang(step.question_key, language_code),
            options: step.options,
        }
    }

    /// Handle one incoming message; `input` is `None` for non-text messages
    pub fn handle(
        &self,
        state: WizardState,
        input: Option<&str>,
        language_code: Option<&str>,
    ) -> Outcome {
        if let Some(command) = input.and_then(Command::parse) {
            debug!(command = ?command, "Global command received");
            return self.handle_command(command, language_code);
        }

        let replay = input.map(str::trim) == Some(REPLAY_RESULT_LABEL);
        if replay && !matches!(state, WizardState::Review { .. }) {
            return self.fail(&BotError::ResultMissing, language_code);
        }

        match state {
            WizardState::Idle => self.handle_idle(language_code),
            WizardState::AwaitingStart => self.handle_awaiting_start(input, language_code),
            WizardState::Answering { step, answers } => {
                self.handle_answer(&step, answers, input, language_code)
            }
            WizardState::HelpMenu => self.handle_help_menu(input, language_code),
            WizardState::Review { result } => {
                if replay {
                    let text = render(self.flow, Some(&result));
                    Outcome::reply(
                        WizardState::Review { result },
                        Reply::new(text, Markup::Keep),
                    )
                } else {
                    Outcome::reply(
                        WizardState::Review { result },
                        Reply::new(t_lang("idle-hint", language_code), Markup::Keep),
                    )
                }
            }
        }
    }

    /// Handle `/start`, `/help` or `/cancel`
    pub fn handle_command(&self, command: Command, language_code: Option<&str>) -> Outcome {
        match command {
            Command::Start => {
                let mut welcome = Reply::new(
                    t_lang("welcome-message", language_code),
                    Markup::menu(START_MENU),
                );
                welcome.image_url = Some(WELCOME_IMAGE_URL);
                Outcome::reply(WizardState::AwaitingStart, welcome)
            }
            Command::Help => Outcome::reply(
                WizardState::HelpMenu,
                Reply::new(t_lang("help-message", language_code), help_menu()),
            ),
            Command::Cancel => Outcome::reply(
                WizardState::Idle,
                Reply::new(t_lang("cancel-message", language_code), Markup::RemoveMenu),
            ),
        }
    }

    /// Outcome for an unexpected failure after the wizard finished
    pub fn system_error(&self, language_code: Option<&str>) -> Outcome {
        Outcome::reply(
            WizardState::Idle,
            Reply::new(t_lang("error-system", language_code), Markup::RemoveMenu),
        )
    }

    /// Outcome for a failure that ends the session
    pub fn fail(&self, error: &BotError, language_code: Option<&str>) -> Outcome {
        warn!(error = %error, "Ending wizard session");
        Outcome::reply(
            WizardState::Idle,
            Reply::new(t_lang(error.user_message_key(), language_code), Markup::RemoveMenu),
        )
    }

    fn handle_idle(&self, language_code: Option<&str>) -> Outcome {
        Outcome::reply(
            WizardState::Idle,
            Reply::new(t_lang("idle-hint", language_code), Markup::Keep),
        )
    }

    fn handle_awaiting_start(&self, input: Option<&str>, language_code: Option<&str>) -> Outcome {
        match input.map(str::trim) {
            Some(START_LABEL) => match self.flow.entry() {
                Some(entry) => {
                    debug!(flow = %self.flow.id, step = %entry.id, "Wizard started");
                    let prompt = self.prompt(entry, language_code);
                    Outcome::reply(
                        WizardState::Answering {
                            step: entry.id.to_string(),
                            answers: AnswerRecord::new(),
                        },
                        prompt_reply(prompt),
                    )
                }
                None => self.fail(&BotError::ResultMissing, language_code),
            },
            Some(GUIDE_LABEL) => Outcome::reply(
                WizardState::Idle,
                Reply::new(
                    t_lang("guide-message", language_code),
                    Markup::link(t_lang("guide-button", language_code), GUIDE_URL),
                ),
            ),
            _ => {
                debug!(error = %BotError::InputIgnored, "Re-prompting start menu");
                Outcome::reply(
                    WizardState::AwaitingStart,
                    Reply::new(t_lang("start-reprompt", language_code), Markup::menu(START_MENU)),
                )
            }
        }
    }

    fn handle_answer(
        &self,
        step_id: &str,
        mut answers: AnswerRecord,
        input: Option<&str>,
        language_code: Option<&str>,
    ) -> Outcome {
        let Some(step) = self.flow.step(step_id) else {
            warn!(step = %step_id, flow = %self.flow.id, "Session points at an unknown step");
            return self.fail(&BotError::ResultMissing, language_code);
        };

        let answer = match accept_input(input) {
            Ok(answer) => answer,
            Err(error) => {
                debug!(step = %step.id, error = %error, "Re-prompting step");
                let prompt = self.prompt(step, language_code);
                let text = t_args_lang(
                    "step-reprompt",
                    &[("question", prompt.text.as_str())],
                    language_code,
                );
                let reply = Reply {
                    text,
                    ..prompt_reply(prompt)
                };
                return Outcome::reply(
                    WizardState::Answering {
                        step: step.id.to_string(),
                        answers,
                    },
                    reply,
                );
            }
        };

        if step.options.is_some() && answer.trim() == CUSTOM_INPUT_LABEL {
            return Outcome::reply(
                WizardState::Answering {
                    step: step.id.to_string(),
                    answers,
                },
                Reply::new(t_lang("custom-input-prompt", language_code), Markup::RemoveMenu),
            );
        }

        let from_menu = step.offers(answer.trim());
        match self.advance(&mut answers, step, &answer, language_code) {
            Advance::Next(prompt) => {
                debug!(step = %step.id, next = %prompt.step.id, from_menu, "Wizard advanced");
                let next = prompt.step.id.to_string();
                Outcome::reply(
                    WizardState::Answering {
                        step: next,
                        answers,
                    },
                    prompt_reply(prompt),
                )
            }
            Advance::Complete => {
                debug!(flow = %self.flow.id, answers = answers.len(), "Wizard completed");
                Outcome {
                    state: WizardState::Idle,
                    replies: vec![Reply::new(
                        t_lang("analysis-start", language_code),
                        Markup::RemoveMenu,
                    )],
                    action: Some(Action::Generate(answers)),
                }
            }
        }
    }

    fn handle_help_menu(&self, input: Option<&str>, language_code: Option<&str>) -> Outcome {
        let link = input.and_then(|text| {
            HELP_LINKS
                .iter()
                .find(|(label, _)| *label == text.trim())
        });

        match link {
            Some((_, url)) => Outcome::reply(
                WizardState::HelpMenu,
                Reply::new(
                    t_lang("help-link-message", language_code),
                    Markup::link(t_lang("help-link-button", language_code), url),
                ),
            ),
            None => Outcome::reply(
                WizardState::HelpMenu,
                Reply::new(t_lang("help-menu-reprompt", language_code), help_menu()),
            ),
        }
    }
}

/// Any non-empty text that is not a command is a valid answer
fn accept_input(input: Option<&str>) -> Result<String, BotError> {
    let input = input.ok_or(BotError::InputIgnored)?;
    if input.trim_start().starts_with('/') {
        return Err(BotError::InputIgnored);
    }
    validate_answer(input).map_err(|_| BotError::InputIgnored)
}

fn prompt_reply(prompt: Prompt) -> Reply {
    let markup = match prompt.options {
        Some(rows) => Markup::menu(rows),
        None => Markup::RemoveMenu,
    };
    Reply::new(prompt.text, markup)
}

fn help_menu() -> Markup {
    Markup::Menu(
        HELP_LINKS
            .iter()
            .map(|(label, _)| vec![label.to_string()])
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help@shortform_script_bot"), Some(Command::Help));
        assert_eq!(Command::parse("  /CANCEL now"), Some(Command::Cancel));
        assert_eq!(Command::parse("/settings"), None);
        assert_eq!(Command::parse("start"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_markup_menu_rows() {
        let markup = Markup::menu(&[&["a", "b"], &["c"]]);
        assert_eq!(
            markup,
            Markup::Menu(vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string()]
            ])
        );
    }
}
