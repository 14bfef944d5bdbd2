//! # Configuration Module
//!
//! Runtime settings read from the environment (after `.env` is loaded by
//! `main`). Only the Telegram token and the Anthropic key are required;
//! everything else has a default.

use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;

use crate::catalog::{Flow, SCRIPT_FLOW};
use crate::generator::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::pipeline::DEFAULT_MAX_TOKENS;

const DEFAULT_PORT: u16 = 3000;
const RENDER_DOMAIN: &str = ".onrender.com";

/// How the bot receives updates from Telegram
#[derive(Debug, Clone, PartialEq)]
pub enum LaunchMode {
    /// Long polling; used for local development
    Polling,
    /// Webhook served on `address`, registered at `url`
    Webhook { address: SocketAddr, url: String },
}

/// Complete bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub anthropic_base_url: String,
    pub max_tokens: u32,
    pub flow: &'static Flow,
    pub database_url: Option<String>,
    pub launch_mode: LaunchMode,
    pub json_logs: bool,
}

impl BotConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let telegram_token = get("TELEGRAM_BOT_TOKEN")
            .or_else(|| get("TELEGRAM_TOKEN"))
            .ok_or_else(|| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        let anthropic_api_key =
            get("ANTHROPIC_API_KEY").ok_or_else(|| anyhow!("ANTHROPIC_API_KEY must be set"))?;

        let max_tokens = match get("LLM_MAX_TOKENS") {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .with_context(|| format!("LLM_MAX_TOKENS is not a valid number: {value}"))?,
            None => DEFAULT_MAX_TOKENS,
        };
        if max_tokens == 0 {
            return Err(anyhow!("LLM_MAX_TOKENS must be greater than zero"));
        }

        let flow = match get("BOT_FLOW") {
            Some(id) => Flow::by_id(id.trim()).ok_or_else(|| anyhow!("Unknown BOT_FLOW: {id}"))?,
            None => &SCRIPT_FLOW,
        };

        let json_logs = get("LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            telegram_token,
            anthropic_api_key,
            anthropic_model: get("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            anthropic_base_url: get("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens,
            flow,
            database_url: get("DATABASE_URL"),
            launch_mode: launch_mode(&get)?,
            json_logs,
        })
    }
}

fn launch_mode<G>(get: &G) -> Result<LaunchMode>
where
    G: Fn(&str) -> Option<String>,
{
    let hosted = get("RENDER")
        .map(|value| value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if !hosted {
        return Ok(LaunchMode::Polling);
    }

    let port = match get("PORT") {
        Some(value) => value
            .trim()
            .parse::<u16>()
            .with_context(|| format!("PORT is not a valid port: {value}"))?,
        None => DEFAULT_PORT,
    };

    let url = match (get("WEBHOOK_URL"), get("RENDER_EXTERNAL_HOSTNAME")) {
        (Some(url), _) => url,
        (None, Some(host)) if host.ends_with(RENDER_DOMAIN) => format!("https://{host}"),
        (None, Some(host)) => format!("https://{host}{RENDER_DOMAIN}"),
        (None, None) => {
            return Err(anyhow!(
                "WEBHOOK_URL or RENDER_EXTERNAL_HOSTNAME must be set when RENDER=true"
            ))
        }
    };

    Ok(LaunchMode::Webhook {
        address: SocketAddr::from(([0, 0, 0, 0], port)),
        url,
    })
}
