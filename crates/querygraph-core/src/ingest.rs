//! Batch ingestion at the analyzer/store boundary.
//!
//! Accepts the three document shapes producers hand us:
//!
//! - an array of analyzer entries (`[{ "id": 1, "source_tables": [...], ... }]`)
//! - an array of stored history rows (`[{ "fileName": ..., "analysisResults": {...} }]`)
//! - the analyzer API list response (`{ "entries": [...] }`)
//!
//! Entries flagged with an analyzer `error` are set aside as [`SkippedEntry`]
//! values. Anything that does not match the record contract is rejected with an
//! [`IngestError`] so that only well-typed records ever reach the builder.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::error::IngestError;
use crate::types::{AnalysisEntry, LineageRecord, RecordId, StoredQuery};

/// An entry the analyzer could not process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEntry {
    /// Position of the entry in its document
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub reason: String,
}

/// Graphable records in input order plus the entries that were set aside.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordBatch {
    pub records: Vec<LineageRecord>,
    pub skipped: Vec<SkippedEntry>,
}

/// Parses a batch document from JSON text.
pub fn parse_batch(json: &str) -> Result<RecordBatch, IngestError> {
    let value: Value = serde_json::from_str(json)?;
    parse_batch_value(value)
}

/// Parses a batch document that has already been decoded into a JSON value.
pub fn parse_batch_value(value: Value) -> Result<RecordBatch, IngestError> {
    match value {
        Value::Array(items) => {
            if items.iter().any(is_history_row) {
                let rows = decode_items::<StoredQuery>(items)?;
                RecordBatch::from_history(rows)
            } else {
                let entries = decode_items::<AnalysisEntry>(items)?;
                RecordBatch::from_entries(entries)
            }
        }
        Value::Object(mut map) => match map.remove("entries") {
            Some(Value::Array(items)) => {
                let entries = decode_items::<AnalysisEntry>(items)?;
                RecordBatch::from_entries(entries)
            }
            _ => Err(IngestError::UnsupportedDocument),
        },
        _ => Err(IngestError::UnsupportedDocument),
    }
}

fn is_history_row(item: &Value) -> bool {
    item.as_object().is_some_and(|obj| {
        obj.contains_key("analysisResults") || obj.contains_key("sqlContent")
    })
}

fn decode_items<T>(items: Vec<Value>) -> Result<Vec<T>, IngestError>
where
    T: for<'de> Deserialize<'de>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|err| IngestError::malformed(index, err.to_string()))
        })
        .collect()
}

impl RecordBatch {
    /// Builds a batch from analyzer entries, keeping their order.
    pub fn from_entries(entries: Vec<AnalysisEntry>) -> Result<Self, IngestError> {
        let mut batch = RecordBatch::default();

        for (index, entry) in entries.into_iter().enumerate() {
            if let Some(reason) = entry.error.clone() {
                batch.skip(SkippedEntry {
                    index,
                    id: entry.id,
                    file_name: None,
                    reason,
                });
                continue;
            }
            batch.records.push(entry_to_record(index, entry, None)?);
        }

        batch.check_unique_ids()?;
        Ok(batch)
    }

    /// Builds a batch from stored history rows, keeping their order.
    ///
    /// Query text and timestamps fall back to the row's own fields when the
    /// analysis result omits them; rows without any id get their 1-based
    /// position as id.
    pub fn from_history(rows: Vec<StoredQuery>) -> Result<Self, IngestError> {
        let mut batch = RecordBatch::default();

        for (index, row) in rows.into_iter().enumerate() {
            let StoredQuery {
                store_id,
                file_name,
                sql_content,
                analysis_results: mut entry,
                created_at,
            } = row;

            if let Some(reason) = entry.error.take() {
                batch.skip(SkippedEntry {
                    index,
                    id: entry.id.or(store_id),
                    file_name: Some(file_name),
                    reason,
                });
                continue;
            }

            entry.id = entry.id.or(store_id).or(Some(RecordId::from(index + 1)));
            entry.query = entry.query.or(Some(sql_content));
            entry.created_at = entry.created_at.or(created_at);

            batch
                .records
                .push(entry_to_record(index, entry, Some(&file_name))?);
        }

        batch.check_unique_ids()?;
        Ok(batch)
    }

    /// Appends `other` after the current records.
    ///
    /// The combined batch is still built from scratch; appending only extends
    /// the input sequence.
    pub fn append(&mut self, other: RecordBatch) -> Result<(), IngestError> {
        let mut seen: HashSet<String> = self.records.iter().map(|r| r.id.to_string()).collect();
        for record in &other.records {
            if !seen.insert(record.id.to_string()) {
                return Err(IngestError::DuplicateId {
                    id: record.id.clone(),
                });
            }
        }

        let offset = self.records.len() + self.skipped.len();
        self.records.extend(other.records);
        self.skipped
            .extend(other.skipped.into_iter().map(|mut skipped| {
                skipped.index += offset;
                skipped
            }));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }

    fn skip(&mut self, entry: SkippedEntry) {
        #[cfg(feature = "tracing")]
        debug!(index = entry.index, reason = %entry.reason, "skipping analyzer entry");
        self.skipped.push(entry);
    }

    /// Ids are compared as rendered: `1` and `"1"` both become `query-1`.
    fn check_unique_ids(&self) -> Result<(), IngestError> {
        let mut seen = HashSet::with_capacity(self.records.len());
        for record in &self.records {
            if !seen.insert(record.id.to_string()) {
                return Err(IngestError::DuplicateId {
                    id: record.id.clone(),
                });
            }
        }
        Ok(())
    }
}

fn entry_to_record(
    index: usize,
    entry: AnalysisEntry,
    file_name: Option<&str>,
) -> Result<LineageRecord, IngestError> {
    let missing = |field: &str| {
        let message = match file_name {
            Some(name) => format!("missing field `{field}` ({name})"),
            None => format!("missing field `{field}`"),
        };
        IngestError::malformed(index, message)
    };

    Ok(LineageRecord {
        id: entry.id.ok_or_else(|| missing("id"))?,
        query: entry.query.ok_or_else(|| missing("query"))?,
        source_tables: entry.source_tables.ok_or_else(|| missing("source_tables"))?,
        target_tables: entry.target_tables.ok_or_else(|| missing("target_tables"))?,
        created_at: entry.created_at.ok_or_else(|| missing("created_at"))?,
        updated_at: entry.updated_at,
    })
}
