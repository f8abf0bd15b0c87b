// file: src/search/dispatcher.rs
// description: concurrent per-cluster relevance queries with bounded fan-out and a deadline-aware barrier
// reference: tokio tasks gated by a semaphore, collected through FuturesUnordered

use crate::error::SearchError;
use crate::llm::{LanguageModel, RetryPolicy};
use crate::models::{ClusterFailure, FailureKind, RelevanceResult};
use crate::search::cluster::Cluster;
use crate::search::progress::ClusterProgress;
use crate::search::prompt::{build_relevance_prompt, parse_relevance};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What the barrier collected before every cluster reported or the call was cut short.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Relevance results in the order they arrived, failed clusters contributing empty ones.
    pub results: Vec<RelevanceResult>,
    pub failures: Vec<ClusterFailure>,
    pub succeeded: usize,
    pub abandoned: usize,
    pub attempts: u32,
    pub deadline_exceeded: bool,
    pub cancelled: bool,
}

impl DispatchOutcome {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty() || self.abandoned > 0
    }
}

enum ClusterOutcome {
    Judged {
        index: usize,
        result: RelevanceResult,
        attempts: u32,
    },
    Failed(ClusterFailure),
    Cancelled {
        index: usize,
    },
}

pub struct QueryDispatcher {
    model: Arc<dyn LanguageModel>,
    retry: RetryPolicy,
    max_concurrency: usize,
    preview_chars: usize,
}

impl QueryDispatcher {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        retry: RetryPolicy,
        max_concurrency: usize,
        preview_chars: usize,
    ) -> Self {
        Self {
            model,
            retry,
            max_concurrency: max_concurrency.max(1),
            preview_chars,
        }
    }

    pub async fn dispatch(
        &self,
        clusters: &[Cluster],
        query: &str,
        cancel: &CancellationToken,
        deadline: Instant,
        progress: Option<&ClusterProgress>,
    ) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        if clusters.is_empty() {
            return outcome;
        }

        info!(
            "Dispatching {} clusters with at most {} concurrent model calls",
            clusters.len(),
            self.max_concurrency
        );

        let task_cancel = cancel.child_token();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut abort_handles = Vec::with_capacity(clusters.len());
        let mut pending = FuturesUnordered::new();

        for (index, cluster) in clusters.iter().enumerate() {
            let prompt = build_relevance_prompt(query, &cluster.documents, self.preview_chars);
            let documents = cluster.len();

            let handle = tokio::spawn(judge_cluster(
                index,
                documents,
                prompt,
                Arc::clone(&self.model),
                Arc::clone(&semaphore),
                self.retry,
                task_cancel.clone(),
            ));
            abort_handles.push(handle.abort_handle());

            pending.push(async move { (index, documents, handle.await) });
        }

        let deadline_sleep = tokio::time::sleep_until(deadline);
        tokio::pin!(deadline_sleep);

        loop {
            tokio::select! {
                biased;

                joined = pending.next() => {
                    let Some((index, documents, joined)) = joined else {
                        break;
                    };

                    let cluster_outcome = joined.unwrap_or_else(|join_error| {
                        error!("Cluster {} task did not complete: {}", index, join_error);
                        ClusterOutcome::Failed(ClusterFailure {
                            cluster_index: index,
                            documents,
                            kind: FailureKind::Panicked,
                            message: join_error.to_string(),
                            attempts: 0,
                        })
                    });

                    self.record(cluster_outcome, &mut outcome, progress);
                }
                _ = &mut deadline_sleep => {
                    outcome.deadline_exceeded = true;
                    break;
                }
                _ = cancel.cancelled() => {
                    outcome.cancelled = true;
                    break;
                }
            }
        }

        if !pending.is_empty() {
            outcome.abandoned += pending.len();
            warn!(
                "Abandoning {} outstanding clusters ({})",
                outcome.abandoned,
                if outcome.deadline_exceeded {
                    "deadline exceeded"
                } else {
                    "search cancelled"
                }
            );
            task_cancel.cancel();
            for handle in &abort_handles {
                handle.abort();
            }
        }

        if let Some(progress) = progress {
            progress.finish();
        }

        debug!(
            "Dispatch finished: {} succeeded, {} failed, {} abandoned",
            outcome.succeeded,
            outcome.failures.len(),
            outcome.abandoned
        );

        outcome
    }

    fn record(
        &self,
        cluster_outcome: ClusterOutcome,
        outcome: &mut DispatchOutcome,
        progress: Option<&ClusterProgress>,
    ) {
        match cluster_outcome {
            ClusterOutcome::Judged {
                index,
                result,
                attempts,
            } => {
                debug!("Cluster {} returned {} relevant ids", index, result.len());
                outcome.attempts += attempts;
                outcome.succeeded += 1;
                outcome.results.push(result);
                if let Some(progress) = progress {
                    progress.inc_succeeded();
                }
            }
            ClusterOutcome::Failed(failure) => {
                warn!(
                    "Cluster {} ({} documents) contributed no results after {} attempt(s): {}",
                    failure.cluster_index, failure.documents, failure.attempts, failure.message
                );
                outcome.attempts += failure.attempts;
                outcome.results.push(RelevanceResult::empty());
                outcome.failures.push(failure);
                if let Some(progress) = progress {
                    progress.inc_failed();
                }
            }
            ClusterOutcome::Cancelled { index } => {
                debug!("Cluster {} observed cancellation", index);
                outcome.abandoned += 1;
            }
        }
    }
}

async fn judge_cluster(
    index: usize,
    documents: usize,
    prompt: String,
    model: Arc<dyn LanguageModel>,
    semaphore: Arc<Semaphore>,
    retry: RetryPolicy,
    cancel: CancellationToken,
) -> ClusterOutcome {
    let _permit = tokio::select! {
        permit = semaphore.acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(_) => return ClusterOutcome::Cancelled { index },
        },
        _ = cancel.cancelled() => return ClusterOutcome::Cancelled { index },
    };

    let attempted = tokio::select! {
        attempted = retry.run(|| model.complete(&prompt)) => attempted,
        _ = cancel.cancelled() => return ClusterOutcome::Cancelled { index },
    };

    let failure = |kind: FailureKind, message: String| {
        ClusterOutcome::Failed(ClusterFailure {
            cluster_index: index,
            documents,
            kind,
            message,
            attempts: attempted.attempts,
        })
    };

    match attempted.result {
        Ok(raw) => match parse_relevance(&raw) {
            Ok(result) => ClusterOutcome::Judged {
                index,
                result,
                attempts: attempted.attempts,
            },
            Err(e) => failure(FailureKind::Unparsable, e.to_string()),
        },
        Err(e) => failure(failure_kind(&e), e.to_string()),
    }
}

fn failure_kind(error: &SearchError) -> FailureKind {
    match error {
        e if e.is_timeout() => FailureKind::Timeout,
        SearchError::ModelStatus { .. } => FailureKind::Status,
        SearchError::ModelResponse(_) => FailureKind::Unparsable,
        _ => FailureKind::Transport,
    }
}
