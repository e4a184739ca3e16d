use chrono::{DateTime, Utc};

use crate::ExportFormat;

/// Builds `{project}-{YYYYmmdd-HHMMSS}-{suffix}.{ext}` file names.
#[derive(Debug, Clone)]
pub struct ExportNaming {
    project_name: String,
    exported_at: DateTime<Utc>,
}

impl ExportNaming {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self::with_exported_at(project_name, Utc::now())
    }

    pub fn with_exported_at(project_name: impl Into<String>, exported_at: DateTime<Utc>) -> Self {
        Self {
            project_name: sanitize_project_name(&project_name.into()),
            exported_at,
        }
    }

    pub fn exported_at(&self) -> DateTime<Utc> {
        self.exported_at
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn filename(&self, format: ExportFormat) -> String {
        let timestamp = self.exported_at.format("%Y%m%d-%H%M%S");
        let (suffix, extension) = format_filename_parts(format);
        format!("{}-{timestamp}-{suffix}.{extension}", self.project_name)
    }
}

fn format_filename_parts(format: ExportFormat) -> (&'static str, &'static str) {
    match format {
        ExportFormat::Json { .. } => ("graph", "json"),
        ExportFormat::Mermaid => ("mermaid", "mmd"),
        ExportFormat::Html => ("view", "html"),
        ExportFormat::CsvBundle => ("csv", "zip"),
    }
}

fn sanitize_project_name(name: &str) -> String {
    let mut cleaned = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        let normalized = ch.to_ascii_lowercase();
        if normalized.is_ascii_alphanumeric() {
            cleaned.push(normalized);
            last_dash = false;
        } else if matches!(normalized, '-' | '_' | ' ' | '.') && !last_dash {
            cleaned.push('-');
            last_dash = true;
        }
    }

    let cleaned = cleaned.trim_matches('-');
    if cleaned.is_empty() {
        "lineage".to_string()
    } else {
        cleaned.to_string()
    }
}
