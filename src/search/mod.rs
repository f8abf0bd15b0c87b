// file: src/search/mod.rs
// description: semantic search engine: clustering, dispatch, aggregation and materialization
// reference: internal module structure

pub mod aggregator;
pub mod cluster;
pub mod dispatcher;
pub mod materializer;
pub mod orchestrator;
pub mod progress;
pub mod prompt;

pub use aggregator::{Aggregated, aggregate};
pub use cluster::{Cluster, ClusterBuilder};
pub use dispatcher::{DispatchOutcome, QueryDispatcher};
pub use materializer::Materializer;
pub use orchestrator::SemanticSearch;
pub use progress::{ClusterProgress, SearchStats};
pub use prompt::{build_relevance_prompt, extract_json_object, parse_relevance};
