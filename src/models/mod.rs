// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod document;
pub mod relevance;
pub mod search_result;

pub use document::{Document, Note, NotePage};
pub use relevance::{ClusterFailure, FailureKind, RelevanceResult, RelevantDocument};
pub use search_result::SearchResponse;
