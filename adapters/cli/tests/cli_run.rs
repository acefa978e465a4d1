use std::process::{Command, Output};

fn maze_escape(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_maze-escape"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run maze-escape")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 output")
}

#[test]
fn exported_layout_inspects_as_connected() {
    let export = maze_escape(&["--seed", "5", "--size", "15", "export"]);
    assert!(export.status.success());
    let encoded = stdout(&export);
    assert!(encoded.starts_with("maze:v1:15x15:"));

    let inspect = maze_escape(&["inspect", encoded.trim()]);
    assert!(inspect.status.success());
    let report = stdout(&inspect);
    assert!(report.contains("dimensions: 15x15"));
    assert!(report.contains("connected: true"));
}

#[test]
fn export_is_deterministic_for_seed() {
    let first = maze_escape(&["--seed", "77", "export"]);
    let second = maze_escape(&["--seed", "77", "export"]);
    assert_eq!(stdout(&first), stdout(&second));
}

#[test]
fn simulate_prints_outcome() {
    let output = maze_escape(&["--seed", "9", "simulate", "--time-limit", "20"]);
    assert!(output.status.success());
    let report = stdout(&output);
    assert!(report.starts_with("Welcome to Maze Escape."));
    assert!(report.contains("outcome: "));
}

#[test]
fn degenerate_size_is_reported() {
    let output = maze_escape(&["--size", "2", "export"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot generate a maze of size 2"));
}

#[test]
fn invalid_layout_string_is_reported() {
    let output = maze_escape(&["inspect", "grid:v1:3x3:abc"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid layout string"));
}
