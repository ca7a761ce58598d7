// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

#![cfg(unix)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const RUNAS_BIN: &str = env!("CARGO_BIN_EXE_runas-cmd");

fn current_user() -> String {
    uzers::get_current_username()
        .and_then(|name| name.into_string().ok())
        .expect("current user has no passwd entry")
}

/// Run the tool with `input` piped to its standard input.
fn run_with_input(args: &[String], input: &str) -> Output {
    let mut child = Command::new(RUNAS_BIN)
        .args(args)
        .env("DD_RUNAS_LOG_LEVEL", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn runas-cmd");

    // The tool may exit before reading everything.
    let _ = child.stdin.take().unwrap().write_all(input.as_bytes());
    child.wait_with_output().expect("Failed to wait for runas-cmd")
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_no_arguments_prints_usage() {
    let output = run_with_input(&[], "");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("Usage: runas-cmd"));
    assert!(!stdout.contains("Command not provided."));
}

#[test]
fn test_flags_without_command() {
    let output = run_with_input(&args(&["/u:bob", "-o", "out.txt"]), "");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.starts_with("Error: Command not provided."));
    assert!(stdout.contains("Usage: runas-cmd"));
}

#[test]
fn test_empty_username_exits_without_password_prompt() {
    let output = run_with_input(&args(&["/bin/true"]), "\n");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("Enter username"));
    assert!(stdout.contains("Username cannot be empty."));
    assert!(!stdout.contains("Enter password"));
}

#[test]
fn test_empty_password() {
    let output = run_with_input(&args(&["-u", "bob", "/bin/true"]), "\n");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("Password cannot be empty."));
    assert!(!stdout.contains("Running"));
}

#[test]
fn test_child_exit_code_is_propagated() {
    let output = run_with_input(
        &[
            "-u".to_string(),
            current_user(),
            "/bin/sh".to_string(),
            "-c".to_string(),
            "echo hello; exit 42".to_string(),
        ],
        "secret\n",
    );
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(42));
    assert!(stdout.contains(&format!(
        "Running '/bin/sh -c \"echo hello; exit 42\"' as {}...",
        current_user()
    )));
    assert!(stdout.contains("hello\n"));
    assert!(stdout.contains("Process exited with code: 42"));
}

#[test]
fn test_prompted_username() {
    let output = run_with_input(
        &args(&["/bin/sh", "-c", "exit 7"]),
        &format!("{}\nsecret\n", current_user()),
    );
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_transcript_file() {
    let temp_dir = TempDir::new().unwrap();
    let transcript = temp_dir.path().join("result.txt");

    let output = run_with_input(
        &[
            format!("/u:{}", current_user()),
            format!("/o:{}", transcript.display()),
            "/bin/sh".to_string(),
            "-c".to_string(),
            "echo hello; sleep 0.1; echo oops >&2".to_string(),
        ],
        "secret\n",
    );
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains(&format!("Output written to: {}", transcript.display())));
    assert!(
        !stdout.lines().any(|line| line == "hello"),
        "child output leaked to the console: {stdout}"
    );

    let content = fs::read_to_string(&transcript).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4, "unexpected transcript: {content}");
    assert!(lines[0].starts_with("Running '/bin/sh -c "));
    assert_eq!(lines[1], "hello");
    assert_eq!(lines[2], "ERROR: oops");
    assert_eq!(lines[3], "Process exited with code: 0");
}

#[test]
fn test_launch_failure_is_mirrored_to_transcript() {
    let temp_dir = TempDir::new().unwrap();
    let transcript = temp_dir.path().join("result.txt");

    let output = run_with_input(
        &[
            "-u".to_string(),
            current_user(),
            "-o".to_string(),
            transcript.display().to_string(),
            "/nonexistent/binary".to_string(),
        ],
        "secret\n",
    );
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("Error: failed to start '/nonexistent/binary'"));

    let content = fs::read_to_string(&transcript).unwrap();
    assert!(content.starts_with("Running '/nonexistent/binary ' as "));
    assert!(content.contains("Error: failed to start '/nonexistent/binary'"));
    assert!(!content.contains("Process exited"));
}

#[test]
fn test_unwritable_transcript_falls_back_to_console() {
    let temp_dir = TempDir::new().unwrap();
    let transcript = temp_dir.path().join("missing").join("result.txt");

    let output = run_with_input(
        &[
            "-u".to_string(),
            current_user(),
            "-o".to_string(),
            transcript.display().to_string(),
            "/bin/echo".to_string(),
            "hello".to_string(),
        ],
        "secret\n",
    );
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("Warning: Could not open output file"));
    assert!(stdout.contains("Output will be displayed on console only."));
    assert!(stdout.contains("hello\n"));
    assert!(!transcript.exists());
}

#[test]
fn test_closed_stdout_exits_with_failure() {
    let mut child = Command::new(RUNAS_BIN)
        .args([
            "-u".to_string(),
            current_user(),
            "/bin/sh".to_string(),
            "-c".to_string(),
            "i=0; while [ $i -lt 100000 ]; do echo line$i; i=$((i+1)); done".to_string(),
        ])
        .env("DD_RUNAS_LOG_LEVEL", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn runas-cmd");

    child.stdin.take().unwrap().write_all(b"secret\n").unwrap();

    // Read up to the status line, then hang up like `| head -1` would.
    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut line = String::new();
    while stdout.read_line(&mut line).unwrap() > 0 && !line.contains("Running '") {
        line.clear();
    }
    assert!(line.contains("Running '"), "status line never arrived");
    drop(stdout);

    let output = child.wait_with_output().expect("Failed to wait for runas-cmd");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(!stderr.contains("panicked"), "stderr: {stderr}");
}
