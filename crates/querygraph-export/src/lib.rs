//! Export renderers for query lineage graphs.
//!
//! Every renderer works on the built `GraphModel` (or on a view for HTML) and
//! returns the exported document in memory; writing it anywhere is up to the
//! caller.

mod csv;
mod error;
mod html;
mod json;
mod mermaid;
mod naming;

pub use self::csv::export_csv_bundle;
pub use error::ExportError;
pub use html::export_html;
pub use json::{export_frame_json, export_json};
pub use mermaid::export_mermaid;
pub use naming::ExportNaming;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Graph model as JSON
    Json { compact: bool },
    /// Mermaid flowchart
    Mermaid,
    /// Standalone interactive HTML page
    Html,
    /// Zip archive of CSV tables
    CsvBundle,
}

impl ExportFormat {
    /// Parses the short names used by the CLI and the HTTP API.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(ExportFormat::Json { compact: false }),
            "mermaid" | "mmd" => Some(ExportFormat::Mermaid),
            "html" => Some(ExportFormat::Html),
            "csv" | "zip" => Some(ExportFormat::CsvBundle),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json { .. } => "application/json",
            ExportFormat::Mermaid => "text/plain; charset=utf-8",
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::CsvBundle => "application/zip",
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, ExportFormat::CsvBundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(
            ExportFormat::from_name("JSON"),
            Some(ExportFormat::Json { compact: false })
        );
        assert_eq!(ExportFormat::from_name("csv"), Some(ExportFormat::CsvBundle));
        assert_eq!(ExportFormat::from_name("xlsx"), None);
        assert!(ExportFormat::CsvBundle.is_binary());
        assert!(!ExportFormat::Html.is_binary());
    }
}
