// file: src/search/cluster.rs
// description: order-preserving greedy partitioning of documents into token-bounded clusters
// reference: sequential first-fit bin packing

use crate::error::{Result, SearchError};
use crate::models::Document;
use crate::tokenizer::TokenCounter;
use serde::Serialize;
use tracing::debug;

/// Documents sent to the model together in one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub documents: Vec<Document>,
    /// Sum of document token counts plus per-document overhead.
    pub token_cost: usize,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// A singleton cluster holding one document that alone exceeds the budget.
    pub fn is_oversized(&self, budget: usize) -> bool {
        self.token_cost > budget
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClusterBuilder {
    budget: usize,
    per_document_overhead: usize,
}

impl ClusterBuilder {
    pub fn new(budget: usize, per_document_overhead: usize) -> Result<Self> {
        if budget == 0 {
            return Err(SearchError::Config(
                "token budget must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            budget,
            per_document_overhead,
        })
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn build(&self, documents: &[Document], counter: &dyn TokenCounter) -> Vec<Cluster> {
        let mut clusters = Vec::new();
        let mut current: Vec<Document> = Vec::new();
        let mut running = 0usize;

        for document in documents {
            let tokens = counter.count_tokens(&document.text);
            let cost = tokens.saturating_add(self.per_document_overhead);

            if cost > self.budget {
                debug!(
                    "Document {} costs {} tokens on its own (budget {}), isolating it",
                    document.id, cost, self.budget
                );
                if !current.is_empty() {
                    clusters.push(Cluster {
                        documents: std::mem::take(&mut current),
                        token_cost: running,
                    });
                    running = 0;
                }
                clusters.push(Cluster {
                    documents: vec![document.clone()],
                    token_cost: cost,
                });
                continue;
            }

            if !current.is_empty() && running.saturating_add(cost) > self.budget {
                clusters.push(Cluster {
                    documents: std::mem::take(&mut current),
                    token_cost: running,
                });
                running = 0;
            }

            current.push(document.clone());
            running = running.saturating_add(cost);
        }

        if !current.is_empty() {
            clusters.push(Cluster {
                documents: current,
                token_cost: running,
            });
        }

        debug!(
            "Partitioned {} documents into {} clusters (budget {})",
            documents.len(),
            clusters.len(),
            self.budget
        );

        clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::HeuristicCounter;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use uuid::Uuid;

    /// One token per character keeps the arithmetic obvious.
    fn counter() -> HeuristicCounter {
        HeuristicCounter::new(1)
    }

    fn doc(len: usize) -> Document {
        Document::new(Uuid::new_v4(), "x".repeat(len))
    }

    fn ids(clusters: &[Cluster]) -> Vec<Vec<Uuid>> {
        clusters
            .iter()
            .map(|c| c.documents.iter().map(|d| d.id).collect())
            .collect()
    }

    #[test]
    fn test_zero_budget_rejected() {
        assert!(ClusterBuilder::new(0, 0).is_err());
    }

    #[test]
    fn test_empty_input_yields_no_clusters() {
        let builder = ClusterBuilder::new(100, 5).unwrap();
        assert!(builder.build(&[], &counter()).is_empty());
    }

    #[test]
    fn test_small_documents_share_one_cluster() {
        let builder = ClusterBuilder::new(100, 5).unwrap();
        let docs = vec![doc(10), doc(20), doc(30)];
        let clusters = builder.build(&docs, &counter());

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].documents, docs);
        assert_eq!(clusters[0].token_cost, 75);
    }

    #[test]
    fn test_overhead_forces_split() {
        // 40 + 10 = 50 fits exactly, the second document pushes to 100 > 99.
        let builder = ClusterBuilder::new(99, 10).unwrap();
        let docs = vec![doc(40), doc(40), doc(40)];
        let clusters = builder.build(&docs, &counter());

        assert_eq!(clusters.len(), 3);
        assert!(clusters.iter().all(|c| c.token_cost == 50));
    }

    #[test]
    fn test_order_is_preserved() {
        let builder = ClusterBuilder::new(50, 0).unwrap();
        let docs = vec![doc(30), doc(30), doc(10), doc(45)];
        let clusters = builder.build(&docs, &counter());

        assert_eq!(
            ids(&clusters),
            vec![
                vec![docs[0].id],
                vec![docs[1].id, docs[2].id],
                vec![docs[3].id]
            ]
        );
    }

    #[test]
    fn test_oversized_document_is_singleton_and_untruncated() {
        let builder = ClusterBuilder::new(50, 2).unwrap();
        let docs = vec![doc(10), doc(10), doc(500), doc(10)];
        let clusters = builder.build(&docs, &counter());

        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].len(), 2);
        assert_eq!(clusters[1].documents, vec![docs[2].clone()]);
        assert_eq!(clusters[1].documents[0].text.len(), 500);
        assert!(clusters[1].is_oversized(50));
        assert_eq!(clusters[2].documents, vec![docs[3].clone()]);
    }

    #[test]
    fn test_zero_token_documents_are_placed() {
        let builder = ClusterBuilder::new(10, 0).unwrap();
        let docs = vec![doc(0), doc(0), doc(10), doc(0)];
        let clusters = builder.build(&docs, &counter());

        let placed: usize = clusters.iter().map(Cluster::len).sum();
        assert_eq!(placed, 4);
    }

    #[test]
    fn test_partition_properties_hold_across_budgets() {
        let lengths = [3, 17, 0, 64, 9, 120, 33, 33, 1, 250, 5, 48, 48, 2, 90];
        let docs: Vec<Document> = lengths.iter().map(|&len| doc(len)).collect();
        let input: HashSet<Uuid> = docs.iter().map(|d| d.id).collect();

        for budget in [1, 10, 50, 64, 100, 250, 1_000] {
            let builder = ClusterBuilder::new(budget, 4).unwrap();
            let clusters = builder.build(&docs, &counter());

            // completeness, no duplicates
            let flattened: Vec<Uuid> = clusters
                .iter()
                .flat_map(|c| c.documents.iter().map(|d| d.id))
                .collect();
            assert_eq!(flattened.len(), docs.len(), "budget {}", budget);
            assert_eq!(flattened.iter().copied().collect::<HashSet<_>>(), input);

            // order preserved across the flattened partition
            assert_eq!(flattened, docs.iter().map(|d| d.id).collect::<Vec<_>>());

            // bound: only singletons whose own tokens exceed the budget may overflow
            for cluster in &clusters {
                assert!(!cluster.is_empty());
                if cluster.token_cost > budget {
                    assert_eq!(cluster.len(), 1, "budget {}", budget);
                    let own = counter().count_tokens(&cluster.documents[0].text) + 4;
                    assert!(own > budget);
                    assert_eq!(cluster.token_cost, own);
                }
            }

            // determinism
            assert_eq!(builder.build(&docs, &counter()), clusters);
        }
    }
}
