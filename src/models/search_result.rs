// file: src/models/search_result.rs
// description: Search response returned to the owning service layer
// reference: materialized notes plus partial-failure observability

use crate::models::{ClusterFailure, Note};
use crate::search::progress::SearchStats;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResponse {
    /// Materialized notes, in aggregation order unless corpus order was requested
    pub documents: Vec<Note>,

    /// Model-supplied justification for each returned note
    pub reasons: HashMap<Uuid, String>,

    /// Wall-clock duration of the whole call
    pub elapsed_seconds: f64,

    /// True when at least one cluster failed or was abandoned
    pub partial: bool,

    /// True when the dispatch deadline fired before every cluster reported
    pub deadline_exceeded: bool,

    pub failures: Vec<ClusterFailure>,

    pub stats: SearchStats,
}

impl SearchResponse {
    pub fn empty(elapsed_seconds: f64) -> Self {
        Self {
            elapsed_seconds,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn reason_for(&self, id: &Uuid) -> Option<&str> {
        self.reasons.get(id).map(String::as_str)
    }

    /// Format as a summary string for display
    pub fn format_summary(&self, max_content_len: usize) -> String {
        let mut output = format!(
            "{} note(s) in {:.2}s{}\n",
            self.documents.len(),
            self.elapsed_seconds,
            if self.partial { " (partial results)" } else { "" }
        );

        for (idx, note) in self.documents.iter().enumerate() {
            let preview: String = note.content.chars().take(max_content_len).collect();
            let ellipsis = if note.content.chars().count() > max_content_len {
                "..."
            } else {
                ""
            };

            output.push_str(&format!("\n{}. {} [{}]\n", idx + 1, note.title, note.id));
            if let Some(reason) = self.reason_for(&note.id).filter(|r| !r.is_empty()) {
                output.push_str(&format!("   Why: {}\n", reason));
            }
            if !preview.is_empty() {
                output.push_str(&format!("   {}{}\n", preview, ellipsis));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response() {
        let response = SearchResponse::empty(0.25);
        assert!(response.is_empty());
        assert!(!response.partial);
        assert_eq!(response.elapsed_seconds, 0.25);
    }

    #[test]
    fn test_format_summary() {
        let note = Note::new("owner", "Budget 2025", "This is a very long content that will be truncated");
        let mut response = SearchResponse::empty(1.5);
        response.reasons.insert(note.id, "talks about money".to_string());
        response.documents.push(note);
        response.partial = true;

        let summary = response.format_summary(20);
        assert!(summary.contains("1 note(s) in 1.50s (partial results)"));
        assert!(summary.contains("Budget 2025"));
        assert!(summary.contains("Why: talks about money"));
        assert!(summary.contains("..."));
    }
}
