// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{Result, SearchError};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub search: SearchConfig,
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
    pub corpus: CorpusConfig,
}

/// OpenAI-compatible chat completions endpoint used for relevance judging.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Upper bound on tokens handed to a single model invocation.
    pub token_budget: usize,
    /// Formatting cost charged per document on top of its own token count.
    pub per_document_overhead: usize,
    /// Maximum characters of each document's text included in a prompt.
    pub preview_chars: usize,
    pub max_concurrency: usize,
    pub deadline_secs: u64,
    pub page_size: usize,
    #[serde(default)]
    pub preserve_corpus_order: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TokenizerConfig {
    /// Path to a Hugging Face `tokenizer.json`; the character heuristic is used when unset.
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub chars_per_token: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorpusConfig {
    pub notes_path: PathBuf,
}

impl SearchConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(
                config::File::from(Path::new("config/default.toml")).required(false),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix("NOTE_SEARCH")
                .separator("__")
                .try_parsing(true),
        );

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| SearchError::Config(e.to_string()))?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(
                builder
                    .build()
                    .map_err(|e| SearchError::Config(e.to_string()))?,
            )
            .build()
            .map_err(|e| SearchError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| SearchError::Config(e.to_string()))?;

        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var("GROQ_API_KEY").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            llm: LlmConfig {
                api_base: "https://api.groq.com/openai/v1".to_string(),
                api_key: None,
                model: "openai/gpt-oss-120b".to_string(),
                temperature: 0.0,
                timeout_secs: 60,
                max_retries: 2,
                retry_backoff_ms: 500,
            },
            search: SearchConfig {
                token_budget: 6_000,
                per_document_overhead: 16,
                preview_chars: 500,
                max_concurrency: 8,
                deadline_secs: 90,
                page_size: 200,
                preserve_corpus_order: false,
            },
            tokenizer: TokenizerConfig::default(),
            corpus: CorpusConfig {
                notes_path: PathBuf::from("data/notes.json"),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.token_budget == 0 {
            return Err(SearchError::Config(
                "token_budget must be greater than 0".to_string(),
            ));
        }

        if self.search.max_concurrency == 0 {
            return Err(SearchError::Config(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.search.page_size == 0 {
            return Err(SearchError::Config(
                "page_size must be greater than 0".to_string(),
            ));
        }

        if self.search.deadline_secs == 0 {
            return Err(SearchError::Config(
                "deadline_secs must be greater than 0".to_string(),
            ));
        }

        if self.search.preview_chars == 0 {
            return Err(SearchError::Config(
                "preview_chars must be greater than 0".to_string(),
            ));
        }

        if !self.llm.api_base.starts_with("http://") && !self.llm.api_base.starts_with("https://")
        {
            return Err(SearchError::Config(format!(
                "Invalid api_base URL: {}",
                self.llm.api_base
            )));
        }

        if self.tokenizer.chars_per_token == Some(0) {
            return Err(SearchError::Config(
                "chars_per_token must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.deadline(), Duration::from_secs(90));
    }

    #[test]
    fn test_zero_budget_rejected() {
        let mut config = Config::default_config();
        config.search.token_budget = 0;
        assert!(matches!(config.validate(), Err(SearchError::Config(_))));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = Config::default_config();
        config.search.max_concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_api_base_rejected() {
        let mut config = Config::default_config();
        config.llm.api_base = "api.groq.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("search.toml");
        fs::write(
            &path,
            "[search]\ntoken_budget = 1200\nmax_concurrency = 3\n\n[corpus]\nnotes_path = \"notes.json\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.search.token_budget, 1200);
        assert_eq!(config.search.max_concurrency, 3);
        assert_eq!(config.search.preview_chars, 500);
        assert_eq!(config.corpus.notes_path, PathBuf::from("notes.json"));
    }
}
