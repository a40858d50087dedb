#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

fn folio(data: &Path) -> Command {
    let mut cmd = Command::cargo_bin("folio").expect("folio binary");
    cmd.env("FOLIO_CONFIG", data.join("missing-config.toml"))
        .env_remove("FOLIO_DATA_DIR")
        .env_remove("FOLIO_REMOTE_URL")
        .env_remove("FOLIO_ACCESS_KEY")
        .env_remove("FOLIO_LOG")
        .arg("--data-dir")
        .arg(data);
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("run folio");
    assert!(
        output.status.success(),
        "folio failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf8 stdout")
}

#[test]
fn add_edit_list_and_delete() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path();

    let out = stdout_of(folio(data).args(["add", "--index", "01", "--title", "X", "--tags", "go, rust"]));
    assert!(out.contains("Project created successfully!"));

    let out = stdout_of(folio(data).arg("list"));
    assert_eq!(out.trim(), "0: [01] X");

    let out = stdout_of(folio(data).args(["edit", "0", "--title", "Y"]));
    assert!(out.contains("Project updated successfully!"));

    let out = stdout_of(folio(data).args(["list", "--json"]));
    let records: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(records[0]["title"], "Y");
    assert_eq!(records[0]["index"], "01");
    assert_eq!(records[0]["tags"], "go, rust");

    let out = stdout_of(folio(data).args(["delete", "0", "--yes"]));
    assert_eq!(out.trim(), "Deleted: Y");

    let out = stdout_of(folio(data).arg("list"));
    assert_eq!(out.trim(), "No projects found in storage.");
}

#[test]
fn declined_delete_keeps_record() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path();
    stdout_of(folio(data).args(["add", "--title", "Keep me"]));

    let out = stdout_of(folio(data).args(["delete", "0"]).write_stdin("n\n"));
    assert!(out.contains("Delete cancelled."));

    let out = stdout_of(folio(data).arg("list"));
    assert!(out.contains("Keep me"));
}

#[test]
fn edit_out_of_range_fails() {
    let tmp = TempDir::new().unwrap();
    folio(tmp.path())
        .args(["edit", "3", "--title", "nope"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn load_local_renders_gallery_page() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path();
    stdout_of(folio(data).args([
        "add",
        "--title",
        "Gallery <One>",
        "--image",
        "img/gif/demo.gif",
        "--tags",
        "go, rust",
    ]));

    let page = data.join("page.html");
    folio(data)
        .args(["load", "local", "--out"])
        .arg(&page)
        .assert()
        .success();

    let html = fs::read_to_string(&page).unwrap();
    assert!(html.contains("<main id=\"projects-container\">"));
    assert!(html.contains("Gallery &lt;One&gt;"));
    assert!(html.contains("img/avif/demo.avif"));
    assert!(html.contains("<span>go</span>"));
    assert!(html.contains("<span>rust</span>"));
}

#[test]
fn load_local_without_data_reports_absent() {
    let tmp = TempDir::new().unwrap();
    let output = folio(tmp.path()).args(["load", "local"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let html = String::from_utf8(output.stdout).unwrap();
    assert!(html.contains("No data found in storage."));
}

#[test]
fn load_remote_without_url_fails() {
    let tmp = TempDir::new().unwrap();
    let output = folio(tmp.path()).args(["load", "remote"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn theme_toggle_persists() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path();

    assert_eq!(stdout_of(folio(data).args(["theme", "show"])).trim(), "dark");
    assert_eq!(stdout_of(folio(data).args(["theme", "toggle"])).trim(), "light");
    assert_eq!(stdout_of(folio(data).args(["theme", "show"])).trim(), "light");
    assert_eq!(stdout_of(folio(data).args(["theme", "set", "dark"])).trim(), "dark");

    stdout_of(folio(data).args(["add", "--title", "T"]));
    stdout_of(folio(data).args(["theme", "set", "light"]));
    let page = data.join("light.html");
    folio(data)
        .args(["load", "local", "--out"])
        .arg(&page)
        .assert()
        .success();
    assert!(fs::read_to_string(&page)
        .unwrap()
        .contains("<body class=\"light-theme\">"));
}

#[test]
fn contact_reports_invalid_fields() {
    let tmp = TempDir::new().unwrap();
    let output = folio(tmp.path())
        .args(["contact", "--name", "R2D2", "--email", "a@b.co", "--comments", "hi"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("error-message-if-any:"));
    assert!(stdout.contains("name"));
}
