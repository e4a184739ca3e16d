//! Interactive graph view.
//!
//! [`GraphView`] holds the transient state layered over a built model: the
//! current selection, the resolved viewport dimensions and the loading flag.
//! It never mutates the model. A new batch replaces the model wholesale and
//! resets the selection in the same call.

mod frame;

pub use frame::{
    format_timestamp, Connector, DetailPanel, NodeBox, NodeStyle, Scene, ViewFrame,
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::builder::build_graph_with;
use crate::layout::LayoutConfig;
use crate::types::{Dimensions, GraphModel, LineageRecord};

/// Selection state of the view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "state", content = "nodeId", rename_all = "camelCase")]
pub enum Selection {
    #[default]
    NoSelection,
    NodeSelected(String),
}

impl Selection {
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Selection::NoSelection => None,
            Selection::NodeSelected(id) => Some(id),
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.node_id() == Some(id)
    }
}

/// Serializable snapshot of the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub dimensions: Dimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_node_id: Option<String>,
    pub loading: bool,
}

/// Selection and viewport state over one immutable graph model.
#[derive(Debug, Clone)]
pub struct GraphView {
    config: LayoutConfig,
    model: GraphModel,
    selection: Selection,
    dimensions: Dimensions,
    loading: bool,
}

impl Default for GraphView {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl GraphView {
    /// Creates an empty view sized to the configured minimum area.
    pub fn new(config: LayoutConfig) -> Self {
        let dimensions = config.minimum_dimensions();
        Self {
            config,
            model: GraphModel {
                bounds: dimensions,
                ..GraphModel::default()
            },
            selection: Selection::NoSelection,
            dimensions,
            loading: false,
        }
    }

    /// Rebuilds the model from `records` and resets the selection.
    pub fn load_records(&mut self, records: &[LineageRecord]) {
        let model = build_graph_with(records, &self.config);
        self.load_model(model);
    }

    /// Replaces the model and resets the selection.
    pub fn load_model(&mut self, model: GraphModel) {
        #[cfg(feature = "tracing")]
        debug!(
            nodes = model.nodes.len(),
            edges = model.edges.len(),
            "replacing view model"
        );

        self.dimensions = model.bounds;
        self.model = model;
        self.selection = Selection::NoSelection;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Applies a click on `node_id` and returns the resulting selection.
    ///
    /// Clicking the selected node clears the selection; clicking any other
    /// node selects it. Clicks on unknown ids, and any click while loading,
    /// leave the state unchanged.
    pub fn click(&mut self, node_id: &str) -> Selection {
        if self.loading || !self.model.contains_node(node_id) {
            #[cfg(feature = "tracing")]
            trace!(node_id, loading = self.loading, "ignoring click");
            return self.selection.clone();
        }

        self.selection = if self.selection.is_selected(node_id) {
            Selection::NoSelection
        } else {
            Selection::NodeSelected(node_id.to_string())
        };

        #[cfg(feature = "tracing")]
        debug!(selection = ?self.selection, "selection changed");

        self.selection.clone()
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::NoSelection;
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn viewport(&self) -> ViewportState {
        ViewportState {
            dimensions: self.dimensions,
            selected_node_id: self.selection.node_id().map(str::to_string),
            loading: self.loading,
        }
    }

    /// Computes what should be drawn for the current state.
    pub fn frame(&self) -> ViewFrame {
        if self.loading {
            ViewFrame::Loading
        } else if self.model.is_empty() {
            ViewFrame::Empty
        } else {
            ViewFrame::Graph(Scene::build(
                &self.model,
                self.dimensions,
                self.selection.node_id(),
                &self.config,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_view() -> GraphView {
        let mut view = GraphView::default();
        view.load_records(&[LineageRecord::new(1, "INSERT INTO b SELECT * FROM a")
            .with_sources(["a"])
            .with_targets(["b"])
            .with_created_at("2024-03-01T10:00:00Z")]);
        view
    }

    #[test]
    fn test_initial_state() {
        let view = GraphView::default();
        assert_eq!(view.selection(), &Selection::NoSelection);
        assert_eq!(view.dimensions(), Dimensions::new(800.0, 600.0));
        assert_eq!(view.frame(), ViewFrame::Empty);
    }

    #[test]
    fn test_click_toggles() {
        let mut view = loaded_view();
        assert_eq!(
            view.click("query-1"),
            Selection::NodeSelected("query-1".to_string())
        );
        assert_eq!(
            view.click("source-0"),
            Selection::NodeSelected("source-0".to_string())
        );
        assert_eq!(view.click("source-0"), Selection::NoSelection);
    }

    #[test]
    fn test_unknown_click_ignored() {
        let mut view = loaded_view();
        view.click("query-1");
        assert_eq!(
            view.click("query-99"),
            Selection::NodeSelected("query-1".to_string())
        );
    }

    #[test]
    fn test_loading_ignores_clicks_and_hides_graph() {
        let mut view = loaded_view();
        view.set_loading(true);
        assert_eq!(view.click("query-1"), Selection::NoSelection);
        assert_eq!(view.frame(), ViewFrame::Loading);

        view.set_loading(false);
        assert!(view.frame().scene().is_some());
    }

    #[test]
    fn test_reload_resets_selection() {
        let mut view = loaded_view();
        view.click("query-1");
        view.load_records(&[]);
        assert_eq!(view.selection(), &Selection::NoSelection);
        assert!(view.frame().is_empty());
    }

    #[test]
    fn test_selection_serialization() {
        let json = serde_json::to_value(Selection::NodeSelected("query-1".into())).unwrap();
        assert_eq!(json["state"], "nodeSelected");
        assert_eq!(json["nodeId"], "query-1");

        let json = serde_json::to_value(Selection::NoSelection).unwrap();
        assert_eq!(json["state"], "noSelection");
    }

    #[test]
    fn test_viewport_snapshot() {
        let mut view = loaded_view();
        view.click("target-1");
        let viewport = view.viewport();
        assert_eq!(viewport.selected_node_id.as_deref(), Some("target-1"));
        assert!(!viewport.loading);
    }
}
