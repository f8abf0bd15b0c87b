// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Corpus fetch failed: {0}")]
    CorpusFetch(String),

    #[error("Model transport error: {message}")]
    ModelTransport { message: String, timeout: bool },

    #[error("Model request failed with status {status}: {body}")]
    ModelStatus { status: u16, body: String },

    #[error("Model response error: {0}")]
    ModelResponse(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SearchError {
    /// Whether retrying the same model call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SearchError::ModelTransport { .. } => true,
            SearchError::ModelStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SearchError::ModelTransport { timeout: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let transport = SearchError::ModelTransport {
            message: "connection reset".to_string(),
            timeout: false,
        };
        assert!(transport.is_transient());
        assert!(!transport.is_timeout());

        let throttled = SearchError::ModelStatus {
            status: 429,
            body: "slow down".to_string(),
        };
        assert!(throttled.is_transient());

        let upstream = SearchError::ModelStatus {
            status: 503,
            body: String::new(),
        };
        assert!(upstream.is_transient());

        let bad_request = SearchError::ModelStatus {
            status: 400,
            body: "bad".to_string(),
        };
        assert!(!bad_request.is_transient());

        assert!(!SearchError::ModelResponse("no json".to_string()).is_transient());
        assert!(!SearchError::Validation("empty".to_string()).is_transient());
    }
}
