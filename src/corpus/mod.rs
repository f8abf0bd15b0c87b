// file: src/corpus/mod.rs
// description: corpus provider contract and implementations
// reference: internal module structure

pub mod json_store;

pub use json_store::JsonNoteStore;

use crate::error::Result;
use crate::models::{Note, NotePage};
use async_trait::async_trait;
use uuid::Uuid;

/// Read access to an owner's notes.
#[async_trait]
pub trait CorpusProvider: Send + Sync {
    async fn list_page(&self, owner_id: &str, offset: usize, limit: usize) -> Result<NotePage>;

    /// `None` when the note does not exist or belongs to someone else.
    async fn get_by_id(&self, owner_id: &str, id: Uuid) -> Result<Option<Note>>;

    async fn list_all(&self, owner_id: &str, page_size: usize) -> Result<Vec<Note>> {
        let page_size = page_size.max(1);
        let mut notes = Vec::new();

        loop {
            let page = self.list_page(owner_id, notes.len(), page_size).await?;
            let fetched = page.notes.len();
            notes.extend(page.notes);

            if !page.has_more || fetched == 0 {
                break;
            }
        }

        Ok(notes)
    }
}
