//! Input records: what the analyzer produces and what the store hands back.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a lineage record.
///
/// The analyzer store issues numeric ids; other producers use strings. Both are
/// accepted and rendered verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Number(value)
    }
}

impl From<i32> for RecordId {
    fn from(value: i32) -> Self {
        RecordId::Number(i64::from(value))
    }
}

impl From<usize> for RecordId {
    fn from(value: usize) -> Self {
        i64::try_from(value)
            .map(RecordId::Number)
            .unwrap_or_else(|_| RecordId::Text(value.to_string()))
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Text(value)
    }
}

/// One analyzed SQL query with the tables it reads from and writes to.
///
/// Table names are opaque: no normalization and no case-folding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineageRecord {
    /// Unique within one batch, stable across renders.
    pub id: RecordId,

    /// Full SQL text, shown in the detail panel only.
    pub query: String,

    /// Tables read, in analyzer order.
    pub source_tables: Vec<String>,

    /// Tables written, in analyzer order.
    pub target_tables: Vec<String>,

    /// ISO-8601 timestamp, display only.
    pub created_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl LineageRecord {
    pub fn new(id: impl Into<RecordId>, query: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            query: query.into(),
            source_tables: Vec::new(),
            target_tables: Vec::new(),
            created_at: String::new(),
            updated_at: None,
        }
    }

    pub fn with_sources<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_tables = tables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_targets<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_tables = tables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = created_at.into();
        self
    }

    /// Number of table slots this record needs in the taller half of its column.
    pub fn column_depth(&self) -> usize {
        self.source_tables.len().max(self.target_tables.len())
    }
}

/// The analyzer's per-query envelope.
///
/// When `error` is set the analysis failed and any other field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_tables: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_tables: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisEntry {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A row of the persistence store's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredQuery {
    /// Store-assigned identifier, when the store exposes one.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<RecordId>,

    pub file_name: String,

    pub sql_content: String,

    pub analysis_results: AnalysisEntry,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// The analyzer API's list response: `{ "entries": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntriesDocument {
    pub entries: Vec<AnalysisEntry>,
}
