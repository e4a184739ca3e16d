//! Test utilities for loading batch fixtures.

use std::path::PathBuf;

use crate::{parse_batch, RecordBatch};

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(manifest_dir).join("tests").join("fixtures")
}

/// Load a batch fixture by file name
pub fn load_batch_fixture(name: &str) -> RecordBatch {
    let path = fixtures_dir().join(name);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture {path:?}: {e}"));
    parse_batch(&content).unwrap_or_else(|e| panic!("Failed to parse fixture {path:?}: {e}"))
}

/// List all JSON fixtures
pub fn list_fixtures() -> Vec<String> {
    let dir = fixtures_dir();
    if !dir.exists() {
        return Vec::new();
    }

    std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(".json") {
                Some(name)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        let dir = fixtures_dir();
        assert!(dir.exists(), "Fixtures directory should exist: {dir:?}");
    }

    #[test]
    fn test_every_fixture_parses() {
        let fixtures = list_fixtures();
        assert!(!fixtures.is_empty(), "Should have batch fixtures");
        for name in fixtures {
            let batch = load_batch_fixture(&name);
            let model = crate::build_graph(&batch.records);
            assert_eq!(
                model.nodes_of_kind(crate::NodeKind::Query).count(),
                batch.len(),
                "{name}"
            );
        }
    }
}
