// file: src/tokenizer/mod.rs
// description: token counting used to size prompt clusters
// reference: https://docs.rs/tokenizers

use crate::config::TokenizerConfig;
use crate::error::{Result, SearchError};
use std::path::Path;
use std::sync::Arc;
use tokenizers::Tokenizer;
use tracing::{error, info};

pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

/// Pure, deterministic token count for a piece of text.
pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}

/// Character-ratio estimate, for deployments without a tokenizer file.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicCounter {
    chars_per_token: usize,
}

impl HeuristicCounter {
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }
}

impl Default for HeuristicCounter {
    fn default() -> Self {
        Self::new(DEFAULT_CHARS_PER_TOKEN)
    }
}

impl TokenCounter for HeuristicCounter {
    fn count_tokens(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token)
    }
}

/// Exact counts from a Hugging Face `tokenizer.json`.
pub struct HfTokenCounter {
    tokenizer: Tokenizer,
    fallback: HeuristicCounter,
}

impl HfTokenCounter {
    pub fn from_file(path: &Path) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            SearchError::Tokenizer(format!(
                "Failed to load tokenizer from {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self {
            tokenizer,
            fallback: HeuristicCounter::default(),
        })
    }
}

impl TokenCounter for HfTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        match self.tokenizer.encode(text, false) {
            Ok(encoding) => encoding.len(),
            Err(err) => {
                error!(error = %err, "Tokenizer failed to encode text, using estimate");
                self.fallback.count_tokens(text)
            }
        }
    }
}

pub fn from_config(config: &TokenizerConfig) -> Result<Arc<dyn TokenCounter>> {
    match &config.path {
        Some(path) => {
            info!("Loading tokenizer from {}", path.display());
            Ok(Arc::new(HfTokenCounter::from_file(path)?))
        }
        None => {
            let ratio = config.chars_per_token.unwrap_or(DEFAULT_CHARS_PER_TOKEN);
            info!("No tokenizer configured, estimating {} chars per token", ratio);
            Ok(Arc::new(HeuristicCounter::new(ratio)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_heuristic_rounds_up() {
        let counter = HeuristicCounter::new(4);
        assert_eq!(counter.count_tokens(""), 0);
        assert_eq!(counter.count_tokens("abc"), 1);
        assert_eq!(counter.count_tokens("abcd"), 1);
        assert_eq!(counter.count_tokens("abcde"), 2);
    }

    #[test]
    fn test_heuristic_counts_chars_not_bytes() {
        let counter = HeuristicCounter::new(1);
        assert_eq!(counter.count_tokens("日本語"), 3);
    }

    #[test]
    fn test_heuristic_is_deterministic() {
        let counter = HeuristicCounter::default();
        let text = "the same note text";
        assert_eq!(counter.count_tokens(text), counter.count_tokens(text));
    }

    #[test]
    fn test_from_config_without_path_uses_heuristic() {
        let counter = from_config(&TokenizerConfig {
            path: None,
            chars_per_token: Some(2),
        })
        .unwrap();
        assert_eq!(counter.count_tokens("abcd"), 2);
    }

    #[test]
    fn test_missing_tokenizer_file_is_error() {
        let result = from_config(&TokenizerConfig {
            path: Some(PathBuf::from("/nonexistent/tokenizer.json")),
            chars_per_token: None,
        });
        assert!(matches!(result, Err(SearchError::Tokenizer(_))));
    }
}
