// file: src/search/materializer.rs
// description: resolves relevant ids back into full notes, skipping anything unresolvable
// reference: order-preserving concurrent lookups via futures::StreamExt::buffered

use crate::corpus::CorpusProvider;
use crate::models::Note;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct Materializer {
    corpus: Arc<dyn CorpusProvider>,
    max_concurrency: usize,
}

impl Materializer {
    pub fn new(corpus: Arc<dyn CorpusProvider>, max_concurrency: usize) -> Self {
        Self {
            corpus,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub async fn materialize(&self, owner_id: &str, ids: &[String]) -> Vec<Note> {
        let mut seen = HashSet::new();
        let parsed: Vec<Uuid> = ids
            .iter()
            .filter_map(|raw| match Uuid::parse_str(raw.trim()) {
                Ok(id) => Some(id),
                Err(e) => {
                    debug!("Skipping malformed note id {:?}: {}", raw, e);
                    None
                }
            })
            .filter(|id| seen.insert(*id))
            .collect();

        let corpus = &self.corpus;
        stream::iter(parsed)
            .map(|id| async move { (id, corpus.get_by_id(owner_id, id).await) })
            .buffered(self.max_concurrency)
            .filter_map(|(id, lookup)| async move {
                match lookup {
                    Ok(Some(note)) => Some(note),
                    Ok(None) => {
                        debug!("Note {} no longer exists, skipping", id);
                        None
                    }
                    Err(e) => {
                        warn!("Failed to load note {}: {}", id, e);
                        None
                    }
                }
            })
            .collect()
            .await
    }
}
