pub mod builder;
pub mod error;
pub mod ingest;
pub mod layout;
pub mod types;
pub mod view;

// Re-export main types and functions
pub use builder::{build_graph, build_graph_using, build_graph_with};
pub use error::{ConfigError, IngestError};
pub use ingest::{parse_batch, parse_batch_value, RecordBatch, SkippedEntry};
pub use layout::{ColumnarLayout, LayoutConfig, LayoutStrategy};
pub use view::{
    format_timestamp, Connector, DetailPanel, GraphView, NodeBox, NodeStyle, Scene, Selection,
    ViewFrame, ViewportState,
};

// Re-export types explicitly
pub use types::{
    // Input records
    AnalysisEntry,
    Dimensions,
    // Graph model
    EdgeLabel,
    EntriesDocument,
    GraphEdge,
    GraphModel,
    GraphNode,
    GraphSummary,
    LineageRecord,
    NodeDetails,
    NodeKind,
    Position,
    RecordId,
    StoredQuery,
};

// Test utilities (must be at end of file)
#[cfg(test)]
pub mod test_utils;
