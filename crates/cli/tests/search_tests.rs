// Integration tests for `spick search` against a local CSV, plus the
// flag plumbing shared by every command.
// Run with: cargo test -p sheetpick-cli --test search_tests -- --nocapture

use std::process::Command;

// A settings file that does not exist: every run falls back to built-in
// defaults, independent of whatever is in the developer's config dir.
const NO_SETTINGS: &str = "/nonexistent/spick-test-settings.json";

fn spick() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_spick"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

// ---------------------------------------------------------------------------
// search --from-csv happy path
// ---------------------------------------------------------------------------

#[test]
fn search_finds_and_brackets_the_match() {
    let output = spick()
        .args([
            "search", "ali",
            "--from-csv", "tests/fixtures/teams.csv",
            "--settings-file", NO_SETTINGS,
        ])
        .output()
        .expect("spick search");

    assert!(output.status.success(), "exit code: {:?}\nstderr: {}",
        output.status, String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[Ali]ce Chen"), "stdout: {}", stdout);
    // Close-but-over-threshold names must not appear
    assert!(!stdout.contains("Alan Turing"), "stdout: {}", stdout);
    assert!(stdout.contains("0.000"), "best hit is an exact prefix: {}", stdout);
}

#[test]
fn search_other_column_by_letter() {
    let output = spick()
        .args([
            "search", "research",
            "--from-csv", "tests/fixtures/teams.csv",
            "--column", "B",
            "--settings-file", NO_SETTINGS,
        ])
        .output()
        .expect("spick search --column B");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("[Research]").count(), 2, "stdout: {}", stdout);
}

#[test]
fn search_max_caps_the_output() {
    let output = spick()
        .args([
            "search", "research",
            "--from-csv", "tests/fixtures/teams.csv",
            "--column", "B",
            "--max", "1",
            "--settings-file", NO_SETTINGS,
        ])
        .output()
        .expect("spick search --max 1");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1, "stdout: {}", stdout);
}

// ---------------------------------------------------------------------------
// search --json
// ---------------------------------------------------------------------------

#[test]
fn search_json_is_a_parsable_hit_array() {
    let output = spick()
        .args([
            "search", "ali",
            "--from-csv", "tests/fixtures/teams.csv",
            "--json",
            "--settings-file", NO_SETTINGS,
        ])
        .output()
        .expect("spick search --json");

    assert!(output.status.success());

    let hits: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let hits = hits.as_array().expect("top level should be an array");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["text"], "Alice Chen");
    assert_eq!(hits[0]["score"], 0.0);

    let segments = hits[0]["segments"].as_array().expect("segments array");
    assert_eq!(segments[0]["matched"], true);
    assert_eq!(segments[0]["text"], "Ali");
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

#[test]
fn no_matches_exits_one_with_empty_stdout() {
    let output = spick()
        .args([
            "search", "zzzz",
            "--from-csv", "tests/fixtures/teams.csv",
            "--settings-file", NO_SETTINGS,
        ])
        .output()
        .expect("spick search zzzz");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "stdout: {}", String::from_utf8_lossy(&output.stdout));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no matches"), "stderr: {}", stderr);
}

#[test]
fn no_matches_with_json_still_prints_an_array() {
    let output = spick()
        .args([
            "search", "zzzz",
            "--from-csv", "tests/fixtures/teams.csv",
            "--json",
            "--settings-file", NO_SETTINGS,
        ])
        .output()
        .expect("spick search zzzz --json");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
}

#[test]
fn empty_projection_exits_with_the_empty_sheet_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("header_only.csv");
    std::fs::write(&path, "Name,Team\n").expect("write fixture");

    let output = spick()
        .args(["search", "ali", "--from-csv"])
        .arg(&path)
        .args(["--settings-file", NO_SETTINGS])
        .output()
        .expect("spick search on header-only csv");

    assert_eq!(output.status.code(), Some(12));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sheet has no data"), "stderr: {}", stderr);
}

#[test]
fn bad_threshold_is_a_usage_error() {
    let output = spick()
        .args([
            "search", "ali",
            "--from-csv", "tests/fixtures/teams.csv",
            "--threshold", "3",
            "--settings-file", NO_SETTINGS,
        ])
        .output()
        .expect("spick search --threshold 3");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("outside 0..=1"), "stderr: {}", stderr);
}

#[test]
fn bad_column_is_a_usage_error() {
    let output = spick()
        .args([
            "search", "ali",
            "--from-csv", "tests/fixtures/teams.csv",
            "--column", "9x",
            "--settings-file", NO_SETTINGS,
        ])
        .output()
        .expect("spick search --column 9x");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--column"), "stderr: {}", stderr);
}

// ---------------------------------------------------------------------------
// Version and config surface
// ---------------------------------------------------------------------------

#[test]
fn long_version_names_the_protocol() {
    let output = spick().arg("--version").output().expect("spick --version");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("protocol: v1"), "stdout: {}", stdout);
}

#[test]
fn config_path_prints_the_settings_file() {
    let output = spick().args(["config", "path"]).output().expect("spick config path");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim().ends_with("settings.json"), "stdout: {}", stdout);
}
