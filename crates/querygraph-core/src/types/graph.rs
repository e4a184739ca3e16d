//! The built lineage graph: positioned nodes and labelled, directed edges.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::common::{Dimensions, Position};

/// Visual and semantic category of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A table read by a query
    Source,
    /// A table written by a query
    Target,
    /// The query itself
    Query,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Source => "source",
            NodeKind::Target => "target",
            NodeKind::Query => "query",
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, NodeKind::Source | NodeKind::Target)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expandable details attached to a node, one shape per node family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeDetails {
    Query {
        query: String,
        timestamp: String,
    },
    Table {
        tables: Vec<String>,
    },
}

/// A positioned node of the lineage graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GraphNode {
    /// Unique within one build
    pub id: String,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Table name, or `Query <id>`
    pub label: String,

    pub position: Position,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<NodeDetails>,
}

impl GraphNode {
    /// The table this node stands for, if it is a table node.
    pub fn table_name(&self) -> Option<&str> {
        if self.kind.is_table() {
            Some(&self.label)
        } else {
            None
        }
    }
}

/// Relationship carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EdgeLabel {
    /// source table → query
    Reads,
    /// query → target table
    Writes,
}

impl EdgeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeLabel::Reads => "reads",
            EdgeLabel::Writes => "writes",
        }
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed edge between two nodes of the same build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: EdgeLabel,
}

/// Output of one build: nodes, edges and the bounding box that contains them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct GraphModel {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub bounds: Dimensions,
}

/// Counts over a built model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    pub query_count: usize,
    pub source_count: usize,
    pub target_count: usize,
    pub edge_count: usize,
    /// Distinct table names across all table nodes
    pub distinct_tables: usize,
}

impl GraphModel {
    /// True when the batch held no records.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Edges that start or end at `id`.
    pub fn edges_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges
            .iter()
            .filter(move |edge| edge.source == id || edge.target == id)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &GraphNode> + '_ {
        self.nodes.iter().filter(move |node| node.kind == kind)
    }

    /// Every table node standing for `table`, in build order.
    ///
    /// Same-named tables are kept as separate nodes per query; this is the
    /// hook a merging strategy would group on.
    pub fn occurrences_of<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a GraphNode> + 'a {
        self.nodes
            .iter()
            .filter(move |node| node.table_name() == Some(table))
    }

    pub fn summary(&self) -> GraphSummary {
        let mut summary = GraphSummary {
            edge_count: self.edges.len(),
            ..GraphSummary::default()
        };
        let mut tables = BTreeSet::new();

        for node in &self.nodes {
            match node.kind {
                NodeKind::Query => summary.query_count += 1,
                NodeKind::Source => summary.source_count += 1,
                NodeKind::Target => summary.target_count += 1,
            }
            if let Some(name) = node.table_name() {
                tables.insert(name);
            }
        }

        summary.distinct_tables = tables.len();
        summary
    }
}
