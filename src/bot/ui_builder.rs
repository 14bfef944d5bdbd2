//! UI Builder module for creating keyboards and splitting long messages

use reqwest::Url;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, KeyboardRemove,
    ReplyMarkup,
};
use tracing::warn;

use crate::catalog::{COMPLETION_LINKS, REPLAY_RESULT_LABEL};
use crate::localization::t_lang;
use crate::wizard::{LinkButton, Markup};

/// Largest chunk sent in a single Telegram message
pub const MESSAGE_CHUNK_LIMIT: usize = 4000;

/// Convert engine markup into a Telegram reply markup; `None` keeps the
/// current keyboard
pub fn reply_markup(markup: &Markup) -> Option<ReplyMarkup> {
    match markup {
        Markup::Keep => None,
        Markup::Menu(rows) => Some(ReplyMarkup::Keyboard(menu_keyboard(rows))),
        Markup::RemoveMenu => Some(ReplyMarkup::KeyboardRemove(KeyboardRemove::new())),
        Markup::Links(rows) => Some(ReplyMarkup::InlineKeyboard(link_keyboard(rows))),
    }
}

/// Reply keyboard with one button per label
pub fn menu_keyboard(rows: &[Vec<String>]) -> KeyboardMarkup {
    let buttons: Vec<Vec<KeyboardButton>> = rows
        .iter()
        .map(|row| row.iter().map(KeyboardButton::new).collect())
        .collect();
    KeyboardMarkup::new(buttons).resize_keyboard()
}

/// Inline keyboard of URL buttons; buttons with an unparsable URL are dropped
pub fn link_keyboard(rows: &[Vec<LinkButton>]) -> InlineKeyboardMarkup {
    let buttons: Vec<Vec<InlineKeyboardButton>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|link| match Url::parse(&link.url) {
                    Ok(url) => Some(InlineKeyboardButton::url(link.label.clone(), url)),
                    Err(e) => {
                        warn!(url = %link.url, error = %e, "Skipping link button with invalid URL");
                        None
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect();
    InlineKeyboardMarkup::new(buttons)
}

/// Link buttons shown under the completion message
pub fn completion_links(language_code: Option<&str>) -> Markup {
    Markup::Links(
        COMPLETION_LINKS
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(key, url)| LinkButton {
                        label: t_lang(key, language_code),
                        url: url.to_string(),
                    })
                    .collect()
            })
            .collect(),
    )
}

/// Reply keyboard offering to show the last result again
pub fn replay_menu() -> Markup {
    Markup::Menu(vec![vec![REPLAY_RESULT_LABEL.to_string()]])
}

/// Split `text` into chunks of at most `limit` characters, breaking on line
/// boundaries where possible
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();

        if line_len > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { line_len } else { line_len + 1 };
        if current_len + needed > limit {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks.retain(|chunk| !chunk.trim().is_empty());
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_is_single_chunk() {
        assert_eq!(split_message("a\nb", 10), vec!["a\nb".to_string()]);
    }

    #[test]
    fn test_split_on_line_boundaries() {
        let chunks = split_message("aaaa\nbbbb\ncccc", 9);
        assert_eq!(chunks, vec!["aaaa\nbbbb".to_string(), "cccc".to_string()]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 9));
    }

    #[test]
    fn test_long_line_is_hard_split() {
        let chunks = split_message("가나다라마바", 4);
        assert_eq!(chunks, vec!["가나다라".to_string(), "마바".to_string()]);
    }

    #[test]
    fn test_completion_links_layout() {
        match completion_links(Some("ko")) {
            Markup::Links(rows) => {
                assert_eq!(rows.len(), COMPLETION_LINKS.len());
                assert!(rows.iter().flatten().all(|link| Url::parse(&link.url).is_ok()));
            }
            other => panic!("unexpected markup: {other:?}"),
        }
    }

    #[test]
    fn test_keep_markup_has_no_reply_markup() {
        assert!(reply_markup(&Markup::Keep).is_none());
        assert!(reply_markup(&replay_menu()).is_some());
    }
}
