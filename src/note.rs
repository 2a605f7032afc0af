//! Core data structures for the notebox application.
//!
//! This module contains the `Note` record, the normalization applied to every
//! record read back from storage, id generation and the per-note colors.
use chrono::{DateTime, Local, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content given to stored notes whose body is missing.
pub const DEFAULT_CONTENT: &str = "Empty note";

/// Human-readable timestamp layout, e.g. `3/14/2025, 9:26:53 AM`.
pub const DATE_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Represents a single note in our system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier, sortable by creation order
    pub id: u64,
    /// Note title, may be empty
    pub title: String,
    /// Note body, possibly Markdown
    pub content: String,
    /// When the note was created, formatted for display
    pub date: String,
    /// Card color token, fixed at creation
    pub color: String,
    /// Whether the body should be rendered as Markdown
    #[serde(default)]
    pub is_markdown: bool,
}

impl Note {
    /// Creates a new note stamped with the current local time.
    pub fn new(id: u64, title: String, content: String, is_markdown: bool) -> Self {
        Note {
            id,
            title,
            content,
            date: format_date(&Local::now()),
            color: creation_color(id),
            is_markdown,
        }
    }

    /// Whether `needle` occurs in the title or content, ignoring case.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }

    /// The darker end of this note's card gradient.
    pub fn darker_color(&self) -> String {
        darker_color_for_id(self.id)
    }

    /// Text color readable on top of this note's card color.
    pub fn text_color(&self) -> &'static str {
        contrast_text_color(&self.color)
    }
}

/// Formats a timestamp the way notes display their date.
pub fn format_date(at: &DateTime<Local>) -> String {
    at.format(DATE_FORMAT).to_string()
}

/// Default card color for a note, a pure function of its id.
pub fn color_for_id(id: u64) -> String {
    format!("hsl({}, 70%, 85%)", id % 360)
}

/// Darker shade of [`color_for_id`] used for the end of the card gradient.
pub fn darker_color_for_id(id: u64) -> String {
    format!("hsl({}, 70%, 75%)", id % 360)
}

/// Color given to a freshly created note.
///
/// Steps the hue by the golden angle so notes created a millisecond apart
/// still land on visibly different colors.
pub fn creation_color(id: u64) -> String {
    let hue = (id % 360) * 137 % 360;
    format!("hsl({}, 70%, 85%)", hue)
}

/// Picks near-black or near-white text for an `hsl(h, s%, l%)` background.
///
/// Anything that does not parse as HSL gets dark text.
pub fn contrast_text_color(color: &str) -> &'static str {
    const DARK: &str = "#111";
    const LIGHT: &str = "#f9f9f9";

    let lightness = color
        .trim()
        .strip_prefix("hsl(")
        .and_then(|rest| rest.strip_suffix(')'))
        .and_then(|body| body.split(',').nth(2))
        .and_then(|part| part.trim().strip_suffix('%'))
        .and_then(|value| value.trim().parse::<f64>().ok());

    match lightness {
        Some(l) if l <= 75.0 => LIGHT,
        _ => DARK,
    }
}

/// Hands out note ids derived from the wall clock.
///
/// Ids are milliseconds since the epoch, bumped past the last issued or
/// observed id so two notes created in the same millisecond never collide
/// and ids keep increasing with creation order.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id, strictly greater than any previous one.
    pub fn next_id(&mut self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let id = now.max(self.last.saturating_add(1));
        self.last = id;
        id
    }

    /// Records an id that exists already so it is never handed out again.
    pub fn observe(&mut self, id: u64) {
        self.last = self.last.max(id);
    }
}

/// Turns one raw stored record into a `Note`, filling in missing fields.
///
/// Returns `None` for records that are not JSON objects. Missing or empty
/// fields take their defaults; a missing or unusable id is replaced with a
/// fresh one from `ids`.
pub fn normalize_record(record: &Value, ids: &mut IdGenerator) -> Option<Note> {
    let fields = match record.as_object() {
        Some(fields) => fields,
        None => {
            warn!("Discarding stored note that is not an object: {}", record);
            return None;
        }
    };

    let id = match fields.get("id").and_then(parse_id) {
        Some(id) => {
            ids.observe(id);
            id
        }
        None => {
            let id = ids.next_id();
            debug!("Stored note has no usable id, assigned {}", id);
            id
        }
    };

    let text = |name: &str| {
        fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Some(Note {
        id,
        title: text("title").unwrap_or_default(),
        content: text("content").unwrap_or_else(|| DEFAULT_CONTENT.to_string()),
        date: text("date").unwrap_or_else(|| format_date(&Local::now())),
        color: text("color").unwrap_or_else(|| color_for_id(id)),
        is_markdown: fields
            .get("isMarkdown")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

fn parse_id(value: &Value) -> Option<u64> {
    if let Some(id) = value.as_u64() {
        return Some(id);
    }
    // Ids written by a JavaScript runtime can come back as whole floats
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
        .map(|f| f as u64)
}
