// file: src/exporter/mod.rs
// description: exporter module exports

pub mod json;

pub use json::{ExportManifest, ExportedSearch, JsonExporter};
