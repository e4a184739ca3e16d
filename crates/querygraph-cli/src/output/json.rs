//! JSON output formatting.

use anyhow::{Context, Result};
use querygraph_core::GraphView;
use querygraph_export::{export_frame_json, export_json};

/// Format the graph model as JSON.
///
/// If `compact` is true, outputs minified JSON without whitespace.
pub fn format_json(view: &GraphView, compact: bool) -> Result<String> {
    export_json(view.model(), compact).context("Failed to export JSON")
}

/// Format what the view currently renders, selection included.
pub fn format_frame_json(view: &GraphView, compact: bool) -> Result<String> {
    export_frame_json(&view.frame(), compact).context("Failed to export view frame")
}

#[cfg(test)]
mod tests {
    use super::*;
    use querygraph_core::LineageRecord;

    fn view() -> GraphView {
        let mut view = GraphView::default();
        view.load_records(&[LineageRecord::new(1, "SELECT * FROM users").with_sources(["users"])]);
        view
    }

    #[test]
    fn test_json_pretty() {
        let json = format_json(&view(), false).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"query-1\""));
    }

    #[test]
    fn test_json_compact() {
        let json = format_json(&view(), true).unwrap();
        assert!(!json.starts_with("{\n"));
    }

    #[test]
    fn test_frame_reflects_selection() {
        let mut view = view();
        view.click("source-0");
        let json = format_frame_json(&view, true).unwrap();
        assert!(json.contains("\"selected\":true"));
        assert!(json.contains("\"tables\":\"users\""));
    }
}
