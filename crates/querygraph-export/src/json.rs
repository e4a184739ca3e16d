use querygraph_core::{GraphModel, ViewFrame};
use serde::Serialize;

use crate::ExportError;

pub fn export_json(model: &GraphModel, compact: bool) -> Result<String, ExportError> {
    to_json(model, compact)
}

/// Serializes what the view currently shows, selection included.
pub fn export_frame_json(frame: &ViewFrame, compact: bool) -> Result<String, ExportError> {
    to_json(frame, compact)
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String, ExportError> {
    if compact {
        serde_json::to_string(value).map_err(|err| ExportError::Serialization(err.to_string()))
    } else {
        serde_json::to_string_pretty(value)
            .map_err(|err| ExportError::Serialization(err.to_string()))
    }
}
