// file: src/exporter/json.rs
// description: json export of search responses with a manifest

use crate::error::Result;
use crate::models::SearchResponse;
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct JsonExporter {
    output_dir: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct ExportedSearch<'a> {
    pub owner_id: &'a str,
    pub query: &'a str,
    #[serde(flatten)]
    pub response: &'a SearchResponse,
}

#[derive(Debug, Serialize)]
pub struct ExportManifest {
    pub exported_at: String,
    pub total_documents: usize,
    pub partial: bool,
    pub files: Vec<String>,
}

impl JsonExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn export_search(
        &self,
        owner_id: &str,
        query: &str,
        response: &SearchResponse,
        pretty: bool,
    ) -> Result<ExportManifest> {
        info!("Starting JSON export to {:?}", self.output_dir);

        let exported = ExportedSearch {
            owner_id,
            query,
            response,
        };

        let now = Utc::now();
        let file_name = format!("search-{}.json", now.format("%Y%m%dT%H%M%S%3fZ"));
        let body = if pretty {
            serde_json::to_string_pretty(&exported)?
        } else {
            serde_json::to_string(&exported)?
        };
        fs::write(self.output_dir.join(&file_name), body)?;

        let manifest = ExportManifest {
            exported_at: now.to_rfc3339(),
            total_documents: response.documents.len(),
            partial: response.partial,
            files: vec![file_name],
        };
        fs::write(
            self.output_dir.join("manifest.json"),
            serde_json::to_string_pretty(&manifest)?,
        )?;

        info!(
            "Export complete: {} documents exported",
            manifest.total_documents
        );
        Ok(manifest)
    }
}
