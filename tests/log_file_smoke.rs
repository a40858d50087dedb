#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use serde_json::Value;
use tempfile::tempdir;

use folio_lib::{flush_file_logs, init_file_logging, init_logging, logging::ENV_LOG};

#[test]
fn file_sink_writes_flattened_json_lines() {
    std::env::set_var(ENV_LOG, "folio=info");
    init_logging();

    let dir = tempdir().unwrap();
    let path = init_file_logging(&dir.path().join("logs")).expect("file logging");
    tracing::info!(target: "folio", event = "smoke_test", marker = "first");
    tracing::debug!(target: "folio", event = "filtered_out");
    flush_file_logs();

    let contents = fs::read_to_string(&path).expect("log file written");
    let lines: Vec<Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(lines.len(), 1, "unexpected log lines: {contents}");

    let line = &lines[0];
    assert_eq!(line["event"], "smoke_test");
    assert_eq!(line["marker"], "first");
    assert_eq!(line["level"], "INFO");
    assert_eq!(line["target"], "folio");
    assert!(line["timestamp"].as_str().is_some());

    tracing::info!(target: "folio", event = "after_flush");
    assert_eq!(fs::read_to_string(&path).unwrap(), contents);
}
