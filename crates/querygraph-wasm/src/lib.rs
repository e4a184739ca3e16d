use chrono::{DateTime, Utc};
use querygraph_core::{
    build_graph_with, parse_batch, parse_batch_value, GraphSummary, GraphView, LayoutConfig,
    LineageRecord, SkippedEntry,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

const SERIALIZE_FALLBACK: &str = r#"{"error":{"code":"SERIALIZATION_ERROR","message":"Failed to serialize result"}}"#;

/// Error payload returned in place of a result.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

fn error_json(code: &'static str, message: impl Into<String>) -> String {
    to_json(&ErrorResponse {
        error: ErrorBody {
            code,
            message: message.into(),
        },
    })
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| SERIALIZE_FALLBACK.to_string())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildRequest {
    /// Any batch document accepted by `parse_batch`
    batch: serde_json::Value,
    #[serde(default)]
    layout: Option<LayoutConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadResponse<'a> {
    summary: GraphSummary,
    skipped: &'a [SkippedEntry],
}

/// Installs the panic hook (and the console subscriber with `tracing`).
///
/// Call once after instantiating the module.
#[wasm_bindgen]
pub fn init() {
    console_error_panic_hook::set_once();
    #[cfg(feature = "tracing")]
    tracing_wasm::set_as_global_default();
}

/// One-shot graph build - accepts `{ batch, layout? }`, returns the graph model
/// This function never throws - errors are returned as `{ error: { code, message } }`
#[wasm_bindgen]
pub fn build_graph_json(request_json: &str) -> String {
    let request: BuildRequest = match serde_json::from_str(request_json) {
        Ok(request) => request,
        Err(e) => return error_json("REQUEST_PARSE_ERROR", format!("Invalid request format: {e}")),
    };

    let layout = request.layout.unwrap_or_default();
    if let Err(e) = layout.validate() {
        return error_json("INVALID_LAYOUT", e.to_string());
    }

    match parse_batch_value(request.batch) {
        Ok(batch) => to_json(&build_graph_with(&batch.records, &layout)),
        Err(e) => error_json("BATCH_PARSE_ERROR", e.to_string()),
    }
}

/// Interactive view owned by the JavaScript side.
///
/// Every method that can fail returns JSON and never throws.
#[wasm_bindgen]
pub struct GraphViewHandle {
    view: GraphView,
    records: Vec<LineageRecord>,
    skipped: Vec<SkippedEntry>,
}

impl Default for GraphViewHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl GraphViewHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> GraphViewHandle {
        GraphViewHandle {
            view: GraphView::default(),
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Replaces the layout and rebuilds the graph from the loaded records.
    #[wasm_bindgen(js_name = setLayoutJson)]
    pub fn set_layout_json(&mut self, layout_json: &str) -> String {
        let layout: LayoutConfig = match serde_json::from_str(layout_json) {
            Ok(layout) => layout,
            Err(e) => return error_json("INVALID_LAYOUT", e.to_string()),
        };
        if let Err(e) = layout.validate() {
            return error_json("INVALID_LAYOUT", e.to_string());
        }

        let loading = self.view.is_loading();
        self.view = GraphView::new(layout);
        self.view.load_records(&self.records);
        self.view.set_loading(loading);
        self.load_response()
    }

    /// Parses a batch document and replaces the graph; the selection resets.
    ///
    /// A rejected batch leaves the current graph untouched.
    #[wasm_bindgen(js_name = loadBatchJson)]
    pub fn load_batch_json(&mut self, batch_json: &str) -> String {
        match parse_batch(batch_json) {
            Ok(batch) => {
                self.view.load_records(&batch.records);
                self.view.set_loading(false);
                self.records = batch.records;
                self.skipped = batch.skipped;
                self.load_response()
            }
            Err(e) => error_json("BATCH_PARSE_ERROR", e.to_string()),
        }
    }

    #[wasm_bindgen(js_name = setLoading)]
    pub fn set_loading(&mut self, loading: bool) {
        self.view.set_loading(loading);
    }

    #[wasm_bindgen(js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.view.is_loading()
    }

    /// Applies a click and returns the resulting selection as JSON.
    pub fn click(&mut self, node_id: &str) -> String {
        to_json(&self.view.click(node_id))
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.view.clear_selection();
    }

    /// Id of the selected node, if any.
    #[wasm_bindgen(js_name = selectedNodeId)]
    pub fn selected_node_id(&self) -> Option<String> {
        self.view.selection().node_id().map(str::to_string)
    }

    #[wasm_bindgen(js_name = frameJson)]
    pub fn frame_json(&self) -> String {
        to_json(&self.view.frame())
    }

    #[wasm_bindgen(js_name = modelJson)]
    pub fn model_json(&self) -> String {
        to_json(self.view.model())
    }

    #[wasm_bindgen(js_name = viewportJson)]
    pub fn viewport_json(&self) -> String {
        to_json(&self.view.viewport())
    }

    #[wasm_bindgen(js_name = exportMermaid)]
    pub fn export_mermaid(&self) -> String {
        querygraph_export::export_mermaid(self.view.model())
    }

    /// Standalone HTML page; the caller supplies the export time since
    /// there is no system clock to read here.
    #[wasm_bindgen(js_name = exportHtml)]
    pub fn export_html(&self, project_name: &str, exported_at_ms: f64) -> String {
        let exported_at = DateTime::<Utc>::from_timestamp_millis(exported_at_ms as i64)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        querygraph_export::export_html(&self.view, project_name, exported_at)
    }

    fn load_response(&self) -> String {
        to_json(&LoadResponse {
            summary: self.view.model().summary(),
            skipped: &self.skipped,
        })
    }
}

/// Get version information
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
