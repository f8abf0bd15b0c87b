// file: src/utils/validation.rs
// description: input validation for search requests
// reference: input validation patterns

use crate::error::{Result, SearchError};

pub struct Validator;

impl Validator {
    pub fn validate_query(query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(SearchError::Validation(
                "search query must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn validate_owner_id(owner_id: &str) -> Result<()> {
        if owner_id.trim().is_empty() {
            return Err(SearchError::Validation(
                "owner id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_query() {
        assert!(Validator::validate_query("tax receipts").is_ok());
        assert!(Validator::validate_query("").is_err());
        assert!(Validator::validate_query("   \n").is_err());
        assert!(Validator::validate_query(&"q".repeat(10_000)).is_ok());
    }

    #[test]
    fn test_validate_owner_id() {
        assert!(Validator::validate_owner_id("alice").is_ok());
        assert!(matches!(
            Validator::validate_owner_id(" "),
            Err(SearchError::Validation(_))
        ));
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(Validator::truncate_text("a longer line", 8), "a longer...");
        assert_eq!(Validator::truncate_text("ünïcode", 3), "ünï...");
    }
}
