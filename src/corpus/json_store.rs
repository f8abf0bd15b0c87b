// file: src/corpus/json_store.rs
// description: corpus provider backed by a JSON export of notes
// reference: https://docs.rs/serde_json

use crate::corpus::CorpusProvider;
use crate::error::{Result, SearchError};
use crate::models::{Note, NotePage};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// All notes held in memory, in the order they appear in the export.
#[derive(Debug, Clone, Default)]
pub struct JsonNoteStore {
    notes: Vec<Note>,
}

impl JsonNoteStore {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            SearchError::CorpusFetch(format!("Cannot read notes from {}: {}", path.display(), e))
        })?;

        let notes: Vec<Note> = serde_json::from_str(&raw).map_err(|e| {
            SearchError::CorpusFetch(format!("Invalid notes file {}: {}", path.display(), e))
        })?;

        info!("Loaded {} notes from {}", notes.len(), path.display());
        Ok(Self { notes })
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn owned_by<'a>(&'a self, owner_id: &'a str) -> impl Iterator<Item = &'a Note> + 'a {
        self.notes.iter().filter(move |note| note.owner_id == owner_id)
    }
}

#[async_trait]
impl CorpusProvider for JsonNoteStore {
    async fn list_page(&self, owner_id: &str, offset: usize, limit: usize) -> Result<NotePage> {
        let mut page: Vec<Note> = self
            .owned_by(owner_id)
            .skip(offset)
            .take(limit.saturating_add(1))
            .cloned()
            .collect();

        let has_more = page.len() > limit;
        page.truncate(limit);

        Ok(NotePage {
            notes: page,
            has_more,
        })
    }

    async fn get_by_id(&self, owner_id: &str, id: Uuid) -> Result<Option<Note>> {
        Ok(self.owned_by(owner_id).find(|note| note.id == id).cloned())
    }
}
