// file: src/search/prompt.rs
// description: relevance prompt construction and recovery of JSON from free-form model output
// reference: https://docs.rs/serde_json

use crate::error::{Result, SearchError};
use crate::models::{Document, RelevanceResult};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct PromptDocument<'a> {
    id: String,
    text: &'a str,
}

pub fn build_relevance_prompt(query: &str, documents: &[Document], preview_chars: usize) -> String {
    let entries: Vec<PromptDocument<'_>> = documents
        .iter()
        .map(|doc| PromptDocument {
            id: doc.id.to_string(),
            text: doc.preview(preview_chars),
        })
        .collect();

    // Serializing a Vec of plain structs cannot fail.
    let notes = serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Decide which of the notes below are relevant to the search query.\n\
         \n\
         Search query:\n\
         {query}\n\
         \n\
         Notes (JSON array of objects with \"id\" and \"text\"):\n\
         {notes}\n\
         \n\
         Respond with a single JSON object of the form\n\
         {{\"relevant\": [{{\"id\": \"<note id>\", \"reason\": \"<one short sentence>\"}}]}}\n\
         listing only notes that are relevant, most relevant first. Use the ids exactly \
         as given. If nothing is relevant respond with {{\"relevant\": []}}."
    )
}

/// Balanced `{...}` spans in `raw`, in order of their opening brace.
fn object_spans(raw: &str) -> impl Iterator<Item = &str> {
    let bytes = raw.as_bytes();
    raw.char_indices()
        .filter(|&(_, c)| c == '{')
        .filter_map(move |(start, _)| balanced_end(bytes, start).map(|end| &raw[start..=end]))
}

/// Returns the first balanced `{...}` span in `raw` that parses as a JSON object.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    object_spans(raw)
        .find(|candidate| matches!(serde_json::from_str::<Value>(candidate), Ok(Value::Object(_))))
}

/// Index of the `}` closing the object opened at `start`, honouring string literals.
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, &byte) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }

    None
}

/// First object in `raw` that carries a relevance list. Objects that parse but
/// lack the list (an echoed note, a stray example) are skipped.
pub fn parse_relevance(raw: &str) -> Result<RelevanceResult> {
    let mut last_error = None;

    for candidate in object_spans(raw) {
        match serde_json::from_str::<RelevanceResult>(candidate) {
            Ok(result) => return Ok(result),
            Err(e) => last_error = Some(e),
        }
    }

    Err(SearchError::ModelResponse(match last_error {
        Some(e) => format!("Model output does not match relevance schema: {}", e),
        None => format!("No JSON object found in model output ({} chars)", raw.len()),
    }))
}
