//! Graph model builder.
//!
//! Turns an ordered batch of lineage records into positioned nodes and
//! labelled edges. The build is a total function of its input: it never fails,
//! it allocates fresh ids on every call, and it gives identical labels, kinds
//! and positions for identical input order.

#[cfg(feature = "tracing")]
use tracing::{debug, info_span};

use crate::layout::{ColumnarLayout, LayoutConfig, LayoutStrategy};
use crate::types::{
    EdgeLabel, GraphEdge, GraphModel, GraphNode, LineageRecord, NodeDetails, NodeKind,
};

/// Builds the graph with the default columnar layout.
pub fn build_graph(records: &[LineageRecord]) -> GraphModel {
    build_graph_with(records, &LayoutConfig::default())
}

/// Builds the graph with the columnar layout tuned by `config`.
pub fn build_graph_with(records: &[LineageRecord], config: &LayoutConfig) -> GraphModel {
    build_graph_using(records, &ColumnarLayout::new(config.clone()))
}

/// Builds the graph with any layout strategy.
pub fn build_graph_using<L>(records: &[LineageRecord], layout: &L) -> GraphModel
where
    L: LayoutStrategy + ?Sized,
{
    #[cfg(feature = "tracing")]
    let _span = info_span!("build_graph", records = records.len()).entered();

    if records.is_empty() {
        return GraphModel {
            nodes: Vec::new(),
            edges: Vec::new(),
            bounds: layout.bounds(records),
        };
    }

    let mut builder = Builder::with_capacity(records);
    for (index, record) in records.iter().enumerate() {
        builder.add_column(index + 1, record, layout);
    }

    let model = GraphModel {
        nodes: builder.nodes,
        edges: builder.edges,
        bounds: layout.bounds(records),
    };

    #[cfg(feature = "tracing")]
    debug!(
        nodes = model.nodes.len(),
        edges = model.edges.len(),
        width = model.bounds.width,
        height = model.bounds.height,
        "built lineage graph"
    );

    model
}

struct Builder {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    /// Shared by every column so table node ids never collide.
    next_table: usize,
}

impl Builder {
    fn with_capacity(records: &[LineageRecord]) -> Self {
        let tables: usize = records
            .iter()
            .map(|r| r.source_tables.len() + r.target_tables.len())
            .sum();

        Self {
            nodes: Vec::with_capacity(records.len() + tables),
            edges: Vec::with_capacity(tables),
            next_table: 0,
        }
    }

    fn add_column<L>(&mut self, column: usize, record: &LineageRecord, layout: &L)
    where
        L: LayoutStrategy + ?Sized,
    {
        let query_id = format!("query-{}", record.id);
        self.nodes.push(GraphNode {
            id: query_id.clone(),
            kind: NodeKind::Query,
            label: format!("Query {}", record.id),
            position: layout.query_position(column),
            details: Some(NodeDetails::Query {
                query: record.query.clone(),
                timestamp: record.created_at.clone(),
            }),
        });

        for (slot, table) in record.source_tables.iter().enumerate() {
            let (node_id, edge_id) = self.allocate(NodeKind::Source);
            self.nodes.push(table_node(
                node_id.clone(),
                NodeKind::Source,
                table,
                layout.source_position(column, slot),
            ));
            self.edges.push(GraphEdge {
                id: edge_id,
                source: node_id,
                target: query_id.clone(),
                label: EdgeLabel::Reads,
            });
        }

        for (slot, table) in record.target_tables.iter().enumerate() {
            let (node_id, edge_id) = self.allocate(NodeKind::Target);
            self.nodes.push(table_node(
                node_id.clone(),
                NodeKind::Target,
                table,
                layout.target_position(column, slot),
            ));
            self.edges.push(GraphEdge {
                id: edge_id,
                source: query_id.clone(),
                target: node_id,
                label: EdgeLabel::Writes,
            });
        }
    }

    /// Hands out the next `(node id, edge id)` pair for a table occurrence.
    fn allocate(&mut self, kind: NodeKind) -> (String, String) {
        let n = self.next_table;
        self.next_table += 1;
        (
            format!("{}-{n}", kind.as_str()),
            format!("conn-{}", self.next_table),
        )
    }
}

fn table_node(
    id: String,
    kind: NodeKind,
    table: &str,
    position: crate::types::Position,
) -> GraphNode {
    GraphNode {
        id,
        kind,
        label: table.to_string(),
        position,
        details: Some(NodeDetails::Table {
            tables: vec![table.to_string()],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dimensions, Position};

    fn orders_record() -> LineageRecord {
        LineageRecord::new(1, "INSERT INTO orders_summary SELECT * FROM orders")
            .with_sources(["orders"])
            .with_targets(["orders_summary"])
            .with_created_at("2024-03-01T10:00:00Z")
    }

    #[test]
    fn test_empty_batch() {
        let model = build_graph(&[]);
        assert!(model.nodes.is_empty());
        assert!(model.edges.is_empty());
        assert_eq!(model.bounds, Dimensions::new(800.0, 600.0));
    }

    #[test]
    fn test_single_record_ids_and_positions() {
        let model = build_graph(&[orders_record()]);

        let ids: Vec<_> = model.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["query-1", "source-0", "target-1"]);

        let edge_ids: Vec<_> = model.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edge_ids, vec!["conn-1", "conn-2"]);

        let query = model.node("query-1").unwrap();
        assert_eq!(query.label, "Query 1");
        assert_eq!(query.position, Position::new(400.0, 300.0));
        assert_eq!(
            query.details,
            Some(NodeDetails::Query {
                query: "INSERT INTO orders_summary SELECT * FROM orders".to_string(),
                timestamp: "2024-03-01T10:00:00Z".to_string(),
            })
        );

        assert_eq!(
            model.node("source-0").unwrap().position,
            Position::new(400.0, 200.0)
        );
        assert_eq!(
            model.node("target-1").unwrap().position,
            Position::new(400.0, 400.0)
        );
    }

    #[test]
    fn test_counter_spans_columns() {
        let records = vec![
            LineageRecord::new(1, "q1").with_sources(["a", "b"]),
            LineageRecord::new(2, "q2").with_sources(["a"]).with_targets(["c"]),
        ];
        let model = build_graph(&records);

        let ids: Vec<_> = model.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["query-1", "source-0", "source-1", "query-2", "source-2", "target-3"]
        );
        assert_eq!(model.occurrences_of("a").count(), 2);
    }

    #[test]
    fn test_custom_layout_config() {
        let config = LayoutConfig {
            horizontal_spacing: 250.0,
            vertical_spacing: 80.0,
            base_y: 500.0,
            ..LayoutConfig::default()
        };
        let model = build_graph_with(&[orders_record()], &config);

        assert_eq!(
            model.node("query-1").unwrap().position,
            Position::new(250.0, 500.0)
        );
        assert_eq!(
            model.node("source-0").unwrap().position,
            Position::new(250.0, 420.0)
        );
    }

    struct DiagonalLayout;

    impl LayoutStrategy for DiagonalLayout {
        fn query_position(&self, column: usize) -> Position {
            Position::new(column as f64, column as f64)
        }

        fn source_position(&self, column: usize, slot: usize) -> Position {
            Position::new(column as f64, -(slot as f64))
        }

        fn target_position(&self, column: usize, slot: usize) -> Position {
            Position::new(column as f64, slot as f64 + 100.0)
        }

        fn bounds(&self, records: &[LineageRecord]) -> Dimensions {
            Dimensions::new(records.len() as f64, records.len() as f64)
        }
    }

    #[test]
    fn test_alternative_strategy_keeps_contract() {
        let model = build_graph_using(&[orders_record()], &DiagonalLayout);
        assert_eq!(model.nodes.len(), 3);
        assert_eq!(model.edges.len(), 2);
        assert_eq!(
            model.node("query-1").unwrap().position,
            Position::new(1.0, 1.0)
        );
        assert_eq!(model.bounds, Dimensions::new(1.0, 1.0));
    }
}
