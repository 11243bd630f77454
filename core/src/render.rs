//! Text helpers for note cards.

use std::borrow::Cow;

use crate::types::Note;

/// Previews longer than this many characters are cut.
pub const PREVIEW_CHARS: usize = 220;

pub const EMPTY_CONTENT: &str = "No content";

/// Card preview: the first `PREVIEW_CHARS` characters, `...` when cut.
pub fn preview(content: &str) -> Cow<'_, str> {
    if content.is_empty() {
        return Cow::Borrowed(EMPTY_CONTENT);
    }
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => Cow::Owned(format!("{}...", &content[..cut])),
        None => Cow::Borrowed(content),
    }
}

/// `Updated <time>` from `updated_at`, else `created_at`.
pub fn updated_label(note: &Note) -> Option<String> {
    note.updated_at
        .or(note.created_at)
        .map(|at| format!("Updated {}", at.format("%Y-%m-%d %H:%M UTC")))
}
