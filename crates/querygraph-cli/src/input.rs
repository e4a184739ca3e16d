//! Input handling for batch files, stdin and layout configuration.

use anyhow::{Context, Result};
use querygraph_core::{parse_batch, LayoutConfig, RecordBatch};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Raw content of one batch document.
#[derive(Debug, Clone)]
pub struct BatchSource {
    pub name: String,
    pub content: String,
}

/// Read batch documents from files or stdin.
///
/// If no files are provided, reads from stdin.
pub fn read_input(files: &[PathBuf]) -> Result<Vec<BatchSource>> {
    if files.is_empty() {
        read_from_stdin()
    } else {
        read_from_files(files)
    }
}

/// Parse every source and concatenate them in order.
///
/// Ids must stay unique across all sources.
pub fn load_batch(sources: &[BatchSource]) -> Result<RecordBatch> {
    let mut batch = RecordBatch::default();
    for source in sources {
        let next = parse_batch(&source.content)
            .with_context(|| format!("Failed to parse batch {}", source.name))?;
        batch
            .append(next)
            .with_context(|| format!("Failed to merge batch {}", source.name))?;
    }
    Ok(batch)
}

/// Read the layout configuration, or the defaults when no file is given.
pub fn read_layout_config(path: Option<&Path>) -> Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout config: {}", path.display()))?;
    let config: LayoutConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse layout config: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid layout config: {}", path.display()))?;
    Ok(config)
}

/// Read a batch from stdin
fn read_from_stdin() -> Result<Vec<BatchSource>> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read from stdin")?;

    Ok(vec![BatchSource {
        name: "<stdin>".to_string(),
        content,
    }])
}

/// Read batches from multiple files
fn read_from_files(files: &[PathBuf]) -> Result<Vec<BatchSource>> {
    files
        .iter()
        .map(|path| {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;

            Ok(BatchSource {
                name: path.display().to_string(),
                content,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FIRST: &str = r#"[{"id": 1, "query": "q1", "source_tables": ["a"], "target_tables": [], "created_at": "t"}]"#;
    const SECOND: &str = r#"[{"id": 2, "query": "q2", "source_tables": [], "target_tables": ["b"], "created_at": "t"}]"#;

    fn source(name: &str, content: &str) -> BatchSource {
        BatchSource {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_read_multiple_files() {
        let mut file1 = NamedTempFile::new().unwrap();
        let mut file2 = NamedTempFile::new().unwrap();
        write!(file1, "{FIRST}").unwrap();
        write!(file2, "{SECOND}").unwrap();

        let sources =
            read_from_files(&[file1.path().to_path_buf(), file2.path().to_path_buf()]).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].content, FIRST);
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_from_files(&[PathBuf::from("/nonexistent/batch.json")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_batch_concatenates_in_order() {
        let batch = load_batch(&[source("first", FIRST), source("second", SECOND)]).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records[0].query, "q1");
        assert_eq!(batch.records[1].query, "q2");
    }

    #[test]
    fn test_load_batch_rejects_duplicates_across_files() {
        let err = load_batch(&[source("first", FIRST), source("again", FIRST)]).unwrap_err();
        assert!(format!("{err:#}").contains("Duplicate record id: 1"));
    }

    #[test]
    fn test_load_batch_names_bad_source() {
        let err = load_batch(&[source("broken.json", "{")]).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_layout_config_defaults_and_overrides() {
        assert_eq!(read_layout_config(None).unwrap(), LayoutConfig::default());

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"horizontalSpacing": 300}}"#).unwrap();
        let config = read_layout_config(Some(file.path())).unwrap();
        assert_eq!(config.horizontal_spacing, 300.0);
        assert_eq!(config.vertical_spacing, 100.0);
    }

    #[test]
    fn test_layout_config_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"verticalSpacing": -5}}"#).unwrap();
        let err = read_layout_config(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("verticalSpacing"));
    }
}
