//! Renderable output of the graph view.
//!
//! A [`ViewFrame`] is plain data: the CLI prints it, the exporters turn it into
//! HTML and the browser handle ships it as JSON. Nothing here touches the
//! selection state; frames are recomputed from the view on demand.

use chrono::{DateTime, NaiveDateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::layout::LayoutConfig;
use crate::types::{
    Dimensions, EdgeLabel, GraphModel, GraphNode, NodeDetails, NodeKind, Position,
};

/// What the view shows for its current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ViewFrame {
    /// A batch is in flight; only the loading indicator is shown.
    Loading,
    /// The batch held no records.
    Empty,
    /// Nodes and connectors of a non-empty batch.
    Graph(Scene),
}

impl ViewFrame {
    pub fn scene(&self) -> Option<&Scene> {
        match self {
            ViewFrame::Graph(scene) => Some(scene),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewFrame::Loading)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ViewFrame::Empty)
    }
}

/// A laid-out graph ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    /// Drawn first so that node boxes sit on top of them
    pub connectors: Vec<Connector>,
    pub nodes: Vec<NodeBox>,
}

impl Scene {
    pub(crate) fn build(
        model: &GraphModel,
        dimensions: Dimensions,
        selected: Option<&str>,
        config: &LayoutConfig,
    ) -> Self {
        let by_id: HashMap<&str, &GraphNode> =
            model.nodes.iter().map(|node| (node.id.as_str(), node)).collect();

        let connectors = model
            .edges
            .iter()
            .filter_map(|edge| {
                let start = by_id.get(edge.source.as_str())?.position;
                let end = by_id.get(edge.target.as_str())?.position;
                Some(Connector::between(edge.id.clone(), edge.label, start, end))
            })
            .collect();

        let nodes = model
            .nodes
            .iter()
            .map(|node| NodeBox::for_node(node, selected == Some(node.id.as_str()), config))
            .collect();

        Scene {
            width: dimensions.width,
            height: dimensions.height,
            connectors,
            nodes,
        }
    }

    pub fn node(&self, id: &str) -> Option<&NodeBox> {
        self.nodes.iter().find(|node| node.node_id == id)
    }

    /// The highlighted node, if any.
    pub fn selected_node(&self) -> Option<&NodeBox> {
        self.nodes.iter().find(|node| node.selected)
    }
}

/// A straight line between two node centers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub edge_id: String,
    pub label: EdgeLabel,
    pub start: Position,
    pub end: Position,
    /// Euclidean distance between the endpoints
    pub length: f64,
    /// Orientation in radians, `atan2(Δy, Δx)`
    pub angle: f64,
    /// Where the label is drawn
    pub midpoint: Position,
}

impl Connector {
    pub fn between(edge_id: String, label: EdgeLabel, start: Position, end: Position) -> Self {
        Self {
            edge_id,
            label,
            start,
            end,
            length: start.distance_to(end),
            angle: start.angle_to(end),
            midpoint: start.midpoint(end),
        }
    }

    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }
}

/// Colour treatment of a node box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeStyle {
    Source,
    Target,
    Query,
    /// Overrides the kind style of the selected node
    Selected,
}

impl NodeStyle {
    pub fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Source => NodeStyle::Source,
            NodeKind::Target => NodeStyle::Target,
            NodeKind::Query => NodeStyle::Query,
        }
    }

    pub fn background(&self) -> &'static str {
        match self {
            NodeStyle::Source => "#f0fdf4",
            NodeStyle::Target => "#faf5ff",
            NodeStyle::Query => "#fff7ed",
            NodeStyle::Selected => "#dbeafe",
        }
    }

    pub fn border_color(&self) -> &'static str {
        match self {
            NodeStyle::Selected => "#3b82f6",
            _ => "#e5e7eb",
        }
    }

    pub fn border_width(&self) -> f64 {
        match self {
            NodeStyle::Selected => 2.0,
            _ => 1.0,
        }
    }
}

/// A fixed-size box centered on a node position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeBox {
    pub node_id: String,
    pub label: String,
    pub kind: NodeKind,
    pub center: Position,
    pub width: f64,
    pub height: f64,
    pub style: NodeStyle,
    pub selected: bool,
    /// Present only on the selected node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<DetailPanel>,
}

impl NodeBox {
    fn for_node(node: &GraphNode, selected: bool, config: &LayoutConfig) -> Self {
        let style = if selected {
            NodeStyle::Selected
        } else {
            NodeStyle::for_kind(node.kind)
        };
        let details = if selected {
            node.details.as_ref().map(DetailPanel::from_details)
        } else {
            None
        };

        NodeBox {
            node_id: node.id.clone(),
            label: node.label.clone(),
            kind: node.kind,
            center: node.position,
            width: config.node_width,
            height: config.node_height,
            style,
            selected,
            details,
        }
    }

    /// Top-left corner of the box.
    pub fn origin(&self) -> Position {
        Position::new(
            self.center.x - self.width / 2.0,
            self.center.y - self.height / 2.0,
        )
    }
}

/// Expanded details of the selected node. Each line is independently present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetailPanel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Human-readable creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Table names joined with `", "`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<String>,
}

impl DetailPanel {
    pub fn from_details(details: &NodeDetails) -> Self {
        match details {
            NodeDetails::Query { query, timestamp } => DetailPanel {
                query: non_empty(query).map(str::to_string),
                created: non_empty(timestamp).map(format_timestamp),
                tables: None,
            },
            NodeDetails::Table { tables } => DetailPanel {
                tables: (!tables.is_empty()).then(|| tables.join(", ")),
                ..DetailPanel::default()
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.created.is_none() && self.tables.is_none()
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Renders an ISO-8601 timestamp as `YYYY-MM-DD HH:MM:SS`.
///
/// Offsets are normalized to UTC. Naive timestamps are taken as-is, and
/// anything unparseable is returned verbatim.
pub fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%Y-%m-%d %H:%M:%S";

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc).format(DISPLAY).to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format(DISPLAY).to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp("2024-03-01T10:00:00Z"),
            "2024-03-01 10:00:00"
        );
        assert_eq!(
            format_timestamp("2024-03-01T12:30:15+02:00"),
            "2024-03-01 10:30:15"
        );
        assert_eq!(
            format_timestamp("2024-03-01T10:00:00.123456"),
            "2024-03-01 10:00:00"
        );
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_connector_geometry() {
        let connector = Connector::between(
            "conn-1".to_string(),
            EdgeLabel::Reads,
            Position::new(400.0, 200.0),
            Position::new(400.0, 300.0),
        );
        assert_eq!(connector.length, 100.0);
        assert_eq!(connector.midpoint, Position::new(400.0, 250.0));
        assert!((connector.angle_degrees() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_detail_panel_lines_are_independent() {
        let panel = DetailPanel::from_details(&NodeDetails::Query {
            query: "SELECT 1".to_string(),
            timestamp: String::new(),
        });
        assert_eq!(panel.query.as_deref(), Some("SELECT 1"));
        assert_eq!(panel.created, None);
        assert_eq!(panel.tables, None);

        let panel = DetailPanel::from_details(&NodeDetails::Table { tables: vec![] });
        assert!(panel.is_empty());

        let panel = DetailPanel::from_details(&NodeDetails::Table {
            tables: vec!["a".to_string(), "b".to_string()],
        });
        assert_eq!(panel.tables.as_deref(), Some("a, b"));
    }

    #[test]
    fn test_node_style_colours() {
        assert_eq!(NodeStyle::Source.background(), "#f0fdf4");
        assert_eq!(NodeStyle::Selected.border_color(), "#3b82f6");
        assert_eq!(NodeStyle::Selected.border_width(), 2.0);
        assert_eq!(NodeStyle::Query.border_width(), 1.0);
        assert_eq!(NodeStyle::for_kind(NodeKind::Target), NodeStyle::Target);
    }

    #[test]
    fn test_frame_serialization_tag() {
        let json = serde_json::to_value(ViewFrame::Empty).unwrap();
        assert_eq!(json["state"], "empty");
        let json = serde_json::to_value(ViewFrame::Loading).unwrap();
        assert_eq!(json["state"], "loading");
    }
}
