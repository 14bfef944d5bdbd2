//! # Section Parser Module
//!
//! Splits free-form model output into named sections using two line markers:
//! `"# "` opens a section and `"- "` starts a bullet. Parsing is forgiving:
//! unrecognized sections are dropped and text without markers is treated as a
//! bullet. The model's output format is not guaranteed, so nothing here fails.

use std::collections::HashMap;
use tracing::{debug, trace};

pub const HEADING_MARKER: &str = "# ";
pub const BULLET_MARKER: &str = "- ";

/// Parse `raw_text` into sections, keeping only titles present in `title_map`
///
/// Returns a mapping from the mapped field name to that section's entries in
/// source order. Entries are either `"# label"` sub-headings or `"- text"`
/// bullets. When a title appears twice, the later section wins.
pub fn parse_sections(
    raw_text: &str,
    title_map: &HashMap<&str, &str>,
) -> HashMap<String, Vec<String>> {
    let mut sections = HashMap::new();
    let mut current_title: Option<String> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for line in raw_text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(title) = line.strip_prefix(HEADING_MARKER) {
            flush_section(current_title.take(), &buffer, title_map, &mut sections);
            buffer.clear();
            current_title = Some(clean_title(title));
            trace!(title = ?current_title, "Opened section");
        } else {
            buffer.push(line);
        }
    }
    flush_section(current_title, &buffer, title_map, &mut sections);

    debug!(
        recognized = sections.len(),
        "Section parsing completed"
    );
    sections
}

fn flush_section(
    title: Option<String>,
    buffer: &[&str],
    title_map: &HashMap<&str, &str>,
    sections: &mut HashMap<String, Vec<String>>,
) {
    let Some(title) = title else {
        return;
    };
    if buffer.is_empty() {
        return;
    }

    let entries = parse_entries(buffer.iter().copied());
    match title_map.get(title.as_str()) {
        Some(field) => {
            sections.insert(field.to_string(), entries);
        }
        None => debug!(title = %title, "Dropping unrecognized section"),
    }
}

/// Strip surrounding whitespace and a trailing colon from a heading
pub fn clean_title(title: &str) -> String {
    let title = title.trim();
    title.strip_suffix(':').unwrap_or(title).trim().to_string()
}

/// Classify the body lines of one section into entries
///
/// - `"- label: value"` becomes a `"# label"` sub-heading followed by
///   `"- value"` when the value is non-empty
/// - `"- text"` is kept as is
/// - `"# label"` is kept as a sub-heading, so already parsed entries
///   parse back to themselves
/// - any other line becomes `"- line"`
pub fn parse_entries<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut entries = Vec::new();

    for line in lines.into_iter().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(body) = line.strip_prefix(BULLET_MARKER) {
            match body.split_once(':') {
                Some((label, value)) => {
                    let label = label.trim();
                    let value = value.trim();
                    if !label.is_empty() {
                        entries.push(format!("{HEADING_MARKER}{label}"));
                    }
                    if !value.is_empty() {
                        entries.push(format!("{BULLET_MARKER}{value}"));
                    }
                }
                None => entries.push(line.to_string()),
            }
        } else if line.starts_with(HEADING_MARKER) {
            entries.push(line.to_string());
        } else {
            entries.push(format!("{BULLET_MARKER}{line}"));
        }
    }

    entries
}
