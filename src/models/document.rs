// file: src/models/document.rs
// description: note entity and the simplified document snapshot used for relevance judging
// reference: internal data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A note as stored by the owning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// One page of an owner's notes, as returned by a corpus provider.
#[derive(Debug, Clone, Default)]
pub struct NotePage {
    pub notes: Vec<Note>,
    pub has_more: bool,
}

/// Minimal text snapshot of a note, sized for a relevance prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: Uuid,
    pub text: String,
}

impl Document {
    pub fn new(id: Uuid, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    pub fn from_note(note: &Note) -> Self {
        let title = note.title.trim();
        let body = note.content.trim();

        let mut text = match (title.is_empty(), body.is_empty()) {
            (false, false) => format!("{}\n{}", title, body),
            (false, true) => title.to_string(),
            (true, _) => body.to_string(),
        };

        if !note.tags.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str("Tags: ");
            text.push_str(&note.tags.join(", "));
        }

        Self { id: note.id, text }
    }

    /// Text cut to at most `max_chars` characters, never splitting a code point.
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => &self.text[..byte_idx],
            None => &self.text,
        }
    }
}
