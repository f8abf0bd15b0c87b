// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod corpus;
pub mod error;
pub mod exporter;
pub mod llm;
pub mod models;
pub mod search;
pub mod tokenizer;
pub mod utils;

pub use config::{Config, CorpusConfig, LlmConfig, SearchConfig, TokenizerConfig};
pub use corpus::{CorpusProvider, JsonNoteStore};
pub use error::{Result, SearchError};
pub use exporter::json::{ExportManifest, JsonExporter};
pub use llm::{GroqChatClient, LanguageModel, RetryPolicy};
pub use models::{
    ClusterFailure, Document, FailureKind, Note, NotePage, RelevanceResult, RelevantDocument,
    SearchResponse,
};
pub use search::{
    Aggregated, Cluster, ClusterBuilder, DispatchOutcome, Materializer, QueryDispatcher,
    SearchStats, SemanticSearch, aggregate,
};
pub use tokenizer::{HeuristicCounter, HfTokenCounter, TokenCounter};
pub use utils::{OperationTimer, Validator};
