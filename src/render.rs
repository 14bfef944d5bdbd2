//! # Result Renderer Module
//!
//! Turns a [`GenerationResult`] into the chat message shown to the user.
//! Section order is fixed by the flow, not by the order the model emitted
//! sections in. Rendering never fails: a missing result or one produced by a
//! different flow collapses to [`RENDER_APOLOGY`].

use crate::catalog::{Flow, SectionSpec, SectionStyle};
use crate::pipeline::GenerationResult;
use crate::sections::{clean_title, BULLET_MARKER, HEADING_MARKER};

/// Returned when there is nothing sensible to render
pub const RENDER_APOLOGY: &str = "분석 중 오류가 발생했습니다.";

const SUBHEADING_PREFIX: &str = "📍 ";
const BULLET_PREFIX: &str = "• ";
const TEXT_INDENT: &str = "  ";

/// Render `result` using `flow`'s layout
pub fn render(flow: &Flow, result: Option<&GenerationResult>) -> String {
    let Some(result) = result else {
        return RENDER_APOLOGY.to_string();
    };
    if result.flow != flow.id {
        return RENDER_APOLOGY.to_string();
    }

    let mut lines = vec![flow.headline.to_string(), String::new()];

    lines.push(flow.primary.header.to_string());
    let primary = if result.primary.trim().is_empty() {
        flow.primary.placeholder
    } else {
        result.primary.as_str()
    };
    lines.extend(decorate_primary(primary));

    for section in flow.sections {
        let body = decorate_section(section, result.field(section.field));
        if body.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(section.header.to_string());
        lines.extend(body);
    }

    lines.join("\n")
}

/// Display-only pass over the draft text: every non-blank line is decorated
fn decorate_primary(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if let Some(title) = line.strip_prefix(HEADING_MARKER) {
                subheading(title)
            } else if let Some(item) = line.strip_prefix(BULLET_MARKER) {
                format!("{BULLET_PREFIX}{}", item.trim())
            } else {
                format!("{TEXT_INDENT}{line}")
            }
        })
        .collect()
}

fn decorate_section(section: &SectionSpec, entries: &[String]) -> Vec<String> {
    match section.style {
        SectionStyle::Bullets => render_entries(entries),
        SectionStyle::Ranked { limit, intro } => {
            let ranked: Vec<String> = entries
                .iter()
                .filter_map(|entry| ranked_label(entry))
                .take(limit)
                .enumerate()
                .map(|(i, tag)| format!("{}. #{}", i + 1, tag))
                .collect();
            if ranked.is_empty() {
                return ranked;
            }
            intro.map(str::to_string).into_iter().chain(ranked).collect()
        }
    }
}

/// Decorate parsed section entries; entries without a marker are skipped
pub fn render_entries(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| {
            if let Some(title) = entry.strip_prefix(HEADING_MARKER) {
                Some(subheading(title))
            } else {
                entry
                    .strip_prefix(BULLET_MARKER)
                    .map(|item| format!("{BULLET_PREFIX}{}", item.trim()))
            }
        })
        .collect()
}

fn subheading(title: &str) -> String {
    format!("\n{SUBHEADING_PREFIX}{}", clean_title(title))
}

/// Bare label of a ranked entry: markers and leading `#` removed
fn ranked_label(entry: &str) -> Option<&str> {
    let label = entry
        .strip_prefix(HEADING_MARKER)
        .or_else(|| entry.strip_prefix(BULLET_MARKER))
        .unwrap_or(entry)
        .trim()
        .trim_start_matches('#')
        .trim();
    (!label.is_empty()).then_some(label)
}
