//! Types for lineage graph construction.
//!
//! Records come in from the analyzer and the store; graph types go out to the
//! view and the exporters. Every type here is plain data with a stable JSON
//! shape.

mod common;
mod graph;
mod record;

pub use common::{Dimensions, Position};
pub use graph::{
    EdgeLabel, GraphEdge, GraphModel, GraphNode, GraphSummary, NodeDetails, NodeKind,
};
pub use record::{AnalysisEntry, EntriesDocument, LineageRecord, RecordId, StoredQuery};
