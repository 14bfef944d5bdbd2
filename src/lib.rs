//! # Short-form Content Telegram Bot
//!
//! A Telegram bot that walks a creator through a fixed questionnaire, asks a
//! hosted language model to draft a short-form video script (or a set of
//! content ideas) from the answers, has the model critique its own draft
//! into labelled sections, and replies with the formatted result.

pub mod bot;
pub mod catalog;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod errors;
pub mod generator;
pub mod localization;
pub mod pipeline;
pub mod render;
pub mod sections;
pub mod wizard;
