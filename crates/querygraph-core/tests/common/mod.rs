use querygraph_core::{parse_batch, RecordBatch};
use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> RecordBatch {
    let path = fixture_path(name);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture {path:?}: {e}"));
    parse_batch(&content).unwrap_or_else(|e| panic!("Failed to parse fixture {path:?}: {e}"))
}
