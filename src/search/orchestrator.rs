// file: src/search/orchestrator.rs
// description: public search entry point sequencing validation, clustering, dispatch and materialization
// reference: orchestrates the asynchronous semantic search workflow

use crate::config::{Config, SearchConfig};
use crate::corpus::CorpusProvider;
use crate::error::{Result, SearchError};
use crate::llm::{GroqChatClient, LanguageModel, RetryPolicy};
use crate::models::{Document, Note, SearchResponse};
use crate::search::aggregator::aggregate;
use crate::search::cluster::{Cluster, ClusterBuilder};
use crate::search::dispatcher::QueryDispatcher;
use crate::search::materializer::Materializer;
use crate::search::progress::{ClusterProgress, SearchStats};
use crate::tokenizer::TokenCounter;
use crate::utils::{OperationTimer, Validator};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

pub struct SemanticSearch {
    corpus: Arc<dyn CorpusProvider>,
    tokenizer: Arc<dyn TokenCounter>,
    builder: ClusterBuilder,
    dispatcher: QueryDispatcher,
    materializer: Materializer,
    settings: SearchConfig,
    show_progress: bool,
}

impl SemanticSearch {
    pub fn new(
        settings: SearchConfig,
        retry: RetryPolicy,
        corpus: Arc<dyn CorpusProvider>,
        tokenizer: Arc<dyn TokenCounter>,
        model: Arc<dyn LanguageModel>,
    ) -> Result<Self> {
        if settings.max_concurrency == 0 {
            return Err(SearchError::Config(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }

        let builder = ClusterBuilder::new(settings.token_budget, settings.per_document_overhead)?;
        let dispatcher = QueryDispatcher::new(
            model,
            retry,
            settings.max_concurrency,
            settings.preview_chars,
        );
        let materializer = Materializer::new(Arc::clone(&corpus), settings.max_concurrency);

        Ok(Self {
            corpus,
            tokenizer,
            builder,
            dispatcher,
            materializer,
            settings,
            show_progress: false,
        })
    }

    /// Wires the Groq client from configuration.
    pub fn from_config(
        config: &Config,
        corpus: Arc<dyn CorpusProvider>,
        tokenizer: Arc<dyn TokenCounter>,
    ) -> Result<Self> {
        config.validate()?;
        let model = Arc::new(GroqChatClient::new(&config.llm)?);

        Self::new(
            config.search.clone(),
            RetryPolicy::from_config(&config.llm),
            corpus,
            tokenizer,
            model,
        )
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub async fn search(&self, owner_id: &str, query: &str) -> Result<SearchResponse> {
        self.search_with_cancel(owner_id, query, CancellationToken::new())
            .await
    }

    pub async fn search_with_cancel(
        &self,
        owner_id: &str,
        query: &str,
        cancel: CancellationToken,
    ) -> Result<SearchResponse> {
        Validator::validate_query(query)?;
        Validator::validate_owner_id(owner_id)?;

        let timer = OperationTimer::new("semantic search");

        let notes = self
            .corpus
            .list_all(owner_id, self.settings.page_size)
            .await
            .map_err(|e| match e {
                SearchError::CorpusFetch(_) => e,
                other => SearchError::CorpusFetch(other.to_string()),
            })?;

        let mut stats = SearchStats::new();
        stats.documents = notes.len();

        if notes.is_empty() {
            info!("Owner {} has no notes, nothing to search", owner_id);
            stats.elapsed_secs = timer.finish().as_secs_f64();
            let mut response = SearchResponse::empty(stats.elapsed_secs);
            response.stats = stats;
            return Ok(response);
        }

        let documents: Vec<Document> = notes.iter().map(Document::from_note).collect();
        let clusters = self.plan(&documents);
        stats.clusters = clusters.len();
        stats.oversized_clusters = clusters
            .iter()
            .filter(|c| c.is_oversized(self.builder.budget()))
            .count();
        timer.checkpoint(&format!(
            "{} notes partitioned into {} clusters",
            documents.len(),
            clusters.len()
        ));

        let progress = if self.show_progress {
            ClusterProgress::new(clusters.len(), true)
        } else {
            ClusterProgress::hidden()
        };

        // the deadline bounds model time only, not the corpus fetch
        let deadline = Instant::now() + self.settings.deadline();
        let outcome = self
            .dispatcher
            .dispatch(&clusters, query, &cancel, deadline, Some(&progress))
            .await;

        timer.warn_if_slow(self.settings.deadline() / 2, "relevance dispatch");

        stats.clusters_succeeded = outcome.succeeded;
        stats.clusters_failed = outcome.failures.len();
        stats.clusters_abandoned = outcome.abandoned;
        stats.model_attempts = outcome.attempts;

        if outcome.deadline_exceeded {
            warn!(
                "Search deadline of {}s reached, returning results from {} of {} clusters",
                self.settings.deadline_secs,
                outcome.results.len(),
                clusters.len()
            );
        }

        let aggregated = aggregate(&outcome.results);
        stats.relevant_ids = aggregated.len();

        let mut materialized = self
            .materializer
            .materialize(owner_id, &aggregated.ids())
            .await;

        if self.settings.preserve_corpus_order {
            sort_by_corpus_order(&mut materialized, &notes);
        }

        let reasons: HashMap<Uuid, String> = aggregated
            .hits
            .iter()
            .filter_map(|hit| {
                Uuid::parse_str(&hit.id)
                    .ok()
                    .map(|id| (id, hit.reason.clone()))
            })
            .collect();
        let reasons = materialized
            .iter()
            .filter_map(|note| reasons.get(&note.id).map(|r| (note.id, r.clone())))
            .collect();

        stats.materialized = materialized.len();
        stats.elapsed_secs = timer.finish_with_count(stats.materialized).as_secs_f64();
        stats.log_summary();

        Ok(SearchResponse {
            documents: materialized,
            reasons,
            elapsed_seconds: stats.elapsed_secs,
            partial: outcome.is_partial(),
            deadline_exceeded: outcome.deadline_exceeded,
            failures: outcome.failures,
            stats,
        })
    }

    /// Partitioning the search would use for these documents, without contacting the model.
    pub fn plan(&self, documents: &[Document]) -> Vec<Cluster> {
        self.builder.build(documents, self.tokenizer.as_ref())
    }

    pub async fn plan_for_owner(&self, owner_id: &str) -> Result<Vec<Cluster>> {
        let notes = self
            .corpus
            .list_all(owner_id, self.settings.page_size)
            .await?;
        let documents: Vec<Document> = notes.iter().map(Document::from_note).collect();
        Ok(self.plan(&documents))
    }
}

fn sort_by_corpus_order(materialized: &mut [Note], corpus: &[Note]) {
    let position: HashMap<Uuid, usize> = corpus
        .iter()
        .enumerate()
        .map(|(idx, note)| (note.id, idx))
        .collect();

    materialized.sort_by_key(|note| position.get(&note.id).copied().unwrap_or(usize::MAX));
}
