// file: src/models/relevance.rs
// description: per-cluster relevance judgments and dispatch failure records
// reference: structured output returned by the language model

use serde::{Deserialize, Serialize};

/// A document the model judged relevant, with its stated justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevantDocument {
    #[serde(alias = "document_id", alias = "documentId", alias = "note_id")]
    pub id: String,
    #[serde(default)]
    pub reason: String,
}

impl RelevantDocument {
    pub fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Everything one cluster's model call reported as relevant. The list key is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceResult {
    #[serde(alias = "results", alias = "documents", alias = "notes")]
    pub relevant: Vec<RelevantDocument>,
}

impl RelevanceResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.relevant.is_empty()
    }

    pub fn len(&self) -> usize {
        self.relevant.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Timeout,
    Status,
    Unparsable,
    Panicked,
}

/// Why a cluster contributed nothing to the search.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterFailure {
    pub cluster_index: usize,
    pub documents: usize,
    pub kind: FailureKind,
    pub message: String,
    pub attempts: u32,
}
