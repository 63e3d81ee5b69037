use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const MAIN_JAVA: &str = "class Main {\n  void run() {}\n}\n";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// A workspace with two top-level projects and a couple of same-named files.
fn workspace() -> TempDir {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "core/src/main/Main.java", MAIN_JAVA);
    write(tmp.path(), "core/src/main/Util.java", "class Util {}\n");
    write(tmp.path(), "tools/gen/Main.java", "class Main {}\n");
    write(tmp.path(), "tools/gen/Other.java", "class Other {}\n");
    return tmp;
}

fn wsopen(root: &Path, args: &[&str]) -> Output {
    return Command::new(env!("CARGO_BIN_EXE_wsopen"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
}

fn stdout(output: &Output) -> String {
    return String::from_utf8_lossy(&output.stdout).into_owned();
}

fn stderr(output: &Output) -> String {
    return String::from_utf8_lossy(&output.stderr).into_owned();
}

#[test]
fn resolve_url_by_trailing_suffix() {
    let ws = workspace();
    let out = wsopen(ws.path(), &["resolve", "https://svn.example.org/repo/trunk/core/src/main/Main.java"]);
    assert!(out.status.success(), "resolve failed: {}", stderr(&out));
    assert!(stdout(&out).trim_end().ends_with("core/src/main/Main.java"), "got {}", stdout(&out));
}

#[test]
fn resolve_json_reports_the_method() {
    let ws = workspace();
    let out = wsopen(ws.path(), &["resolve", "--json", "trunk/core/src/main/Main.java"]);
    assert!(out.status.success(), "resolve failed: {}", stderr(&out));

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["method"], "exact-suffix");
    assert_eq!(json["segments"], 4);
    assert_eq!(json["file"]["path"], "/core/src/main/Main.java");
}

#[test]
fn resolve_falls_back_to_name_search() {
    let ws = workspace();
    let out = wsopen(ws.path(), &["resolve", "--json", "branches/x/src/main/Util.java"]);
    assert!(out.status.success(), "resolve failed: {}", stderr(&out));

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["method"], "single-candidate");
    assert_eq!(json["file"]["path"], "/core/src/main/Util.java");
}

#[test]
fn unknown_file_exits_one() {
    let ws = workspace();
    let out = wsopen(ws.path(), &["resolve", "repo/trunk/Missing.java"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("No Workspace File"), "got {}", stderr(&out));
    assert!(stdout(&out).is_empty());
}

#[test]
fn open_prints_location_at_offset() {
    let ws = workspace();
    let out = wsopen(ws.path(), &["open", "trunk/core/src/main/Main.java", "--offset", "15"]);
    assert!(out.status.success(), "open failed: {}", stderr(&out));
    assert!(stdout(&out).ends_with("core/src/main/Main.java:2:3\n"), "got {}", stdout(&out));
}

#[test]
fn find_text_wins_over_offset() {
    let ws = workspace();
    let out = wsopen(ws.path(), &["open", "core/src/main/Main.java", "--offset", "0", "--find", "VOID RUN"]);
    assert!(out.status.success(), "open failed: {}", stderr(&out));
    assert!(stdout(&out).ends_with("Main.java:2:3\n"), "got {}", stdout(&out));
}

#[test]
fn offset_past_end_exits_two() {
    let ws = workspace();
    let out = wsopen(ws.path(), &["open", "core/src/main/Main.java", "--offset", "999"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("Offset Out Of Range"));
}

#[test]
fn open_file_uri_maps_into_the_workspace() {
    let ws = workspace();
    let disk = ws.path().canonicalize().unwrap().join("tools/gen/Other.java");
    let uri = format!("file://{}", disk.display());
    let out = wsopen(ws.path(), &["open", &uri]);
    assert!(out.status.success(), "open failed: {}", stderr(&out));
    assert!(stdout(&out).ends_with("tools/gen/Other.java:1:1\n"), "got {}", stdout(&out));
}

#[test]
fn compare_same_file_name_opens_once() {
    let ws = workspace();
    let out = wsopen(ws.path(), &["compare", "r1/core/src/main/Main.java", "r2/core/src/main/Main.java"]);
    assert!(out.status.success(), "compare failed: {}", stderr(&out));
    assert_eq!(stdout(&out).lines().count(), 1);
}

#[test]
fn compare_renamed_file_opens_both_sides() {
    let ws = workspace();
    let out = wsopen(ws.path(), &["compare", "r1/tools/gen/Main.java", "r2/tools/gen/Other.java"]);
    assert!(out.status.success(), "compare failed: {}", stderr(&out));

    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("tools/gen/Main.java:1:1"));
    assert!(lines[1].ends_with("tools/gen/Other.java:1:1"));
}

#[test]
fn history_joins_path_and_name() {
    let ws = workspace();
    let out = wsopen(ws.path(), &["history", "/trunk/tools/gen", "Main.java", "--find", "class"]);
    assert!(out.status.success(), "history failed: {}", stderr(&out));
    assert!(stdout(&out).ends_with("tools/gen/Main.java:1:1\n"), "got {}", stdout(&out));
}

#[test]
fn scan_lists_files_by_name() {
    let ws = workspace();
    let out = wsopen(ws.path(), &["scan", "--name", "Main.java"]);
    assert!(out.status.success(), "scan failed: {}", stderr(&out));
    assert_eq!(stdout(&out), "/core/src/main/Main.java\n/tools/gen/Main.java\n");
}

#[test]
fn closed_project_is_not_searched() {
    let ws = workspace();
    write(ws.path(), "legacy/src/Old.java", "class Old {}\n");
    write(ws.path(), ".wsopen.toml", "closed = [\"legacy\"]\n");

    let out = wsopen(ws.path(), &["resolve", "repo/legacy/src/Old.java"]);
    assert_eq!(out.status.code(), Some(1), "stdout: {}", stdout(&out));
}

#[test]
fn weak_best_match_is_rejected_by_min_score() {
    let ws = workspace();
    write(ws.path(), ".wsopen.toml", "min_score = 2\n");

    // Both Main.java files agree with the reference only on the file name.
    let out = wsopen(ws.path(), &["open", "repo/elsewhere/Main.java"]);
    assert_eq!(out.status.code(), Some(1), "stdout: {}", stdout(&out));

    // `resolve` reports the raw pick regardless.
    let out = wsopen(ws.path(), &["resolve", "--json", "repo/elsewhere/Main.java"]);
    assert!(out.status.success(), "resolve failed: {}", stderr(&out));
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["method"], "best-score");
    assert_eq!(json["score"], 1);
    assert_eq!(json["file"]["path"], "/tools/gen/Main.java");
}

#[test]
fn malformed_config_exits_two() {
    let ws = workspace();
    write(ws.path(), ".wsopen.toml", "tie_break = 3\n");
    let out = wsopen(ws.path(), &["scan"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("Invalid Config"));
}

#[test]
fn scan_under_a_subtree() {
    let ws = workspace();
    let out = wsopen(ws.path(), &["scan", "--under", "tools"]);
    assert!(out.status.success(), "scan failed: {}", stderr(&out));
    assert_eq!(stdout(&out), "/tools/gen/Main.java\n/tools/gen/Other.java\n");
}
