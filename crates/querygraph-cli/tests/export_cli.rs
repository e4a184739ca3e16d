use std::io::Read;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

const BATCH: &str = r#"[
  {"id": 1, "query": "INSERT INTO orders_summary SELECT * FROM orders",
   "source_tables": ["orders"], "target_tables": ["orders_summary"],
   "created_at": "2024-03-01T10:00:00Z"}
]"#;

const HISTORY_WITH_ERROR: &str = r#"[
  {"_id": 2, "fileName": "broken.sql", "sqlContent": "SELEC oops",
   "analysisResults": {"error": "Invalid or empty SQL query"}},
  {"_id": 1, "fileName": "users.sql", "sqlContent": "SELECT * FROM users",
   "analysisResults": {"source_tables": ["users"], "target_tables": []},
   "createdAt": "2024-03-01T07:30:00Z"}
]"#;

fn write_batch(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write batch");
    path.to_str().expect("batch path").to_string()
}

fn querygraph() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_querygraph"));
    command.env_remove("RUST_LOG");
    command
}

#[test]
fn exports_csv_archive_to_file() {
    let dir = tempdir().expect("temp dir");
    let batch = write_batch(dir.path(), "batch.json", BATCH);
    let output_path = dir.path().join("lineage.csv.zip");

    let status = querygraph()
        .args([
            "-f",
            "csv",
            "-o",
            output_path.to_str().expect("output path"),
            &batch,
        ])
        .status()
        .expect("run CLI");

    assert!(status.success());

    let file = std::fs::File::open(&output_path).expect("output exists");
    let mut archive = zip::ZipArchive::new(file).expect("valid zip");
    let mut nodes = String::new();
    archive
        .by_name("nodes.csv")
        .expect("nodes.csv in archive")
        .read_to_string(&mut nodes)
        .expect("read nodes.csv");
    assert!(nodes.starts_with("Node ID,Type,Label"));
    assert!(nodes.contains("query-1"));
}

#[test]
fn prints_graph_json_to_stdout() {
    let dir = tempdir().expect("temp dir");
    let batch = write_batch(dir.path(), "batch.json", BATCH);

    let output = querygraph()
        .args(["-f", "json", "--compact", &batch])
        .output()
        .expect("run CLI");

    assert!(output.status.success());
    let graph: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(graph["nodes"].as_array().map(Vec::len), Some(3));
    assert_eq!(graph["edges"].as_array().map(Vec::len), Some(2));
    assert_eq!(graph["nodes"][0]["id"], "query-1");
}

#[test]
fn select_flag_drives_frame_output() {
    let dir = tempdir().expect("temp dir");
    let batch = write_batch(dir.path(), "batch.json", BATCH);

    let output = querygraph()
        .args(["-f", "frame", "--select", "query-1", &batch])
        .output()
        .expect("run CLI");

    assert!(output.status.success());
    let frame: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(frame["state"], "graph");

    let selected: Vec<_> = frame["nodes"]
        .as_array()
        .expect("nodes")
        .iter()
        .filter(|node| node["selected"] == true)
        .collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0]["nodeId"], "query-1");
    assert_eq!(selected[0]["details"]["created"], "2024-03-01 10:00:00");
}

#[test]
fn unknown_select_warns_and_keeps_going() {
    let dir = tempdir().expect("temp dir");
    let batch = write_batch(dir.path(), "batch.json", BATCH);

    let output = querygraph()
        .args(["-f", "frame", "--select", "query-42", &batch])
        .output()
        .expect("run CLI");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no node with id query-42"));
}

#[test]
fn skipped_entries_exit_with_failure() {
    let dir = tempdir().expect("temp dir");
    let batch = write_batch(dir.path(), "history.json", HISTORY_WITH_ERROR);

    let output = querygraph().args([&batch]).output().expect("run CLI");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Summary: 1 queries"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("skipped entry 0 (broken.sql): Invalid or empty SQL query"));
}

#[test]
fn malformed_batch_is_a_config_error() {
    let dir = tempdir().expect("temp dir");
    let batch = write_batch(
        dir.path(),
        "bad.json",
        r#"[{"id": 1, "query": "q", "source_tables": "orders", "target_tables": [], "created_at": "t"}]"#,
    );

    let output = querygraph().args([&batch]).output().expect("run CLI");

    assert_eq!(output.status.code(), Some(66));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("querygraph: error:"));
    assert!(stderr.contains("bad.json"));
}

#[test]
fn invalid_layout_config_is_rejected() {
    let dir = tempdir().expect("temp dir");
    let batch = write_batch(dir.path(), "batch.json", BATCH);
    let layout = write_batch(dir.path(), "layout.json", r#"{"minWidth": 0}"#);

    let output = querygraph()
        .args(["--layout-config", &layout, &batch])
        .output()
        .expect("run CLI");

    assert_eq!(output.status.code(), Some(66));
}

#[test]
fn emits_batch_schema() {
    let output = querygraph()
        .args(["--emit-schema", "--compact"])
        .output()
        .expect("run CLI");

    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).expect("schema json");
    assert!(schema.get("LineageRecord").is_some());
    assert!(schema.get("LayoutConfig").is_some());
}

#[test]
fn exports_html_page() {
    let dir = tempdir().expect("temp dir");
    let batch = write_batch(dir.path(), "batch.json", BATCH);
    let output_path = dir.path().join("view.html");

    let status = querygraph()
        .args([
            "-f",
            "html",
            "--project-name",
            "Orders",
            "-o",
            output_path.to_str().expect("output path"),
            &batch,
        ])
        .status()
        .expect("run CLI");

    assert!(status.success());
    let html = std::fs::read_to_string(&output_path).expect("html output");
    assert!(html.contains("<title>Orders - Query Lineage</title>"));
    assert!(html.contains("data-node-id=\"query-1\""));
}
