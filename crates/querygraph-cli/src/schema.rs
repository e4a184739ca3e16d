//! JSON Schema of the batch documents accepted on input.

use anyhow::{Context, Result};
use querygraph_core::{AnalysisEntry, EntriesDocument, LayoutConfig, LineageRecord, StoredQuery};
use schemars::generate::SchemaSettings;
use serde_json::json;

/// Schema bundle printed by `--emit-schema`.
pub fn batch_schema() -> serde_json::Value {
    let generator = SchemaSettings::draft07().into_generator();
    json!({
        "LineageRecord": generator.clone().into_root_schema_for::<LineageRecord>(),
        "AnalysisEntry": generator.clone().into_root_schema_for::<AnalysisEntry>(),
        "StoredQuery": generator.clone().into_root_schema_for::<StoredQuery>(),
        "EntriesDocument": generator.clone().into_root_schema_for::<EntriesDocument>(),
        "LayoutConfig": generator.into_root_schema_for::<LayoutConfig>(),
    })
}

pub fn batch_schema_json(compact: bool) -> Result<String> {
    let schema = batch_schema();
    if compact {
        serde_json::to_string(&schema).context("Failed to serialize schema")
    } else {
        serde_json::to_string_pretty(&schema).context("Failed to serialize schema")
    }
}
