//! Chat-style rendering of the message list
//!
//! Messages are right-aligned bubbles, grouped under a centred date label
//! whenever the calendar date changes. Widths are display columns, so
//! Devanagari combining marks and wide characters line up.

use crate::speech::PlaybackCoordinator;
use crate::store::{date_label, format_time, needs_date_separator, LocalStorage, MessageStore};
use chrono::NaiveDate;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Narrowest bubble we wrap to
const MIN_BUBBLE_WIDTH: usize = 16;

/// Render the title, date separators and messages as display lines
pub fn render_messages<S: LocalStorage>(
    store: &MessageStore<S>,
    coordinator: &PlaybackCoordinator,
    today: NaiveDate,
    width: usize,
) -> Vec<String> {
    let width = width.max(MIN_BUBBLE_WIDTH + 4);
    let bubble_width = (width * 3 / 4).max(MIN_BUBBLE_WIDTH);
    let mut lines = vec![center(&format!("══ {} ══", store.title()), width)];

    if store.is_empty() {
        lines.push(String::new());
        lines.push(center("No messages yet. Type or /paste one.", width));
        return lines;
    }

    let mut previous = None;
    for (index, message) in store.messages().iter().enumerate() {
        if needs_date_separator(message.timestamp(), previous) {
            lines.push(String::new());
            lines.push(center(&format!("── {} ──", date_label(message.timestamp(), today)), width));
        }
        previous = Some(message.timestamp());

        for line in wrap(message.text(), bubble_width) {
            lines.push(right_align(&line, width));
        }

        let mut meta = format!("#{}  {}", index + 1, format_time(message.timestamp()));
        if coordinator.is_speaking(message.id()) {
            meta.push_str("  ▶ speaking");
        }
        lines.push(right_align(&meta, width));
    }

    lines
}

/// Wrap text to a display width, keeping the text's own line breaks
///
/// Words wider than the limit are split by character.
pub fn wrap(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.width();
            let needed = if current.is_empty() { word_width } else { current_width + 1 + word_width };

            if needed <= max_width {
                if !current.is_empty() {
                    current.push(' ');
                    current_width += 1;
                }
                current.push_str(word);
                current_width += word_width;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }

            if word_width <= max_width {
                current.push_str(word);
                current_width = word_width;
                continue;
            }

            for ch in word.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if current_width + ch_width > max_width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(ch);
                current_width += ch_width;
            }
        }

        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn right_align(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width());
    format!("{}{}", " ".repeat(pad), text)
}

fn center(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}
