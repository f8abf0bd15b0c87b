// file: src/search/aggregator.rs
// description: merges per-cluster relevance results into one deduplicated id list
// reference: order-stable dedup with a seen set

use crate::models::{RelevanceResult, RelevantDocument};
use std::collections::HashSet;

/// Unique relevant ids in first-seen order, each with the first reason given for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregated {
    pub hits: Vec<RelevantDocument>,
}

impl Aggregated {
    pub fn ids(&self) -> Vec<String> {
        self.hits.iter().map(|hit| hit.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

pub fn aggregate(results: &[RelevanceResult]) -> Aggregated {
    let mut seen: HashSet<String> = HashSet::new();
    let mut hits = Vec::new();

    for result in results {
        for relevant in &result.relevant {
            let id = relevant.id.trim();
            if id.is_empty() {
                continue;
            }

            if seen.insert(id.to_string()) {
                hits.push(RelevantDocument::new(id, relevant.reason.trim()));
            }
        }
    }

    Aggregated { hits }
}
