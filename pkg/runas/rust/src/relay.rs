// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Forwarding the child's output to the [`OutputSink`] while it runs.
//!
//! One reader task per pipe sends whole lines over a channel; the caller is
//! the only writer of the sink, so lines are recorded in arrival order and
//! never interleave mid-line.

use std::io;

use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::errors::Error;
use crate::launcher::{LaunchedChild, OutputPipe};
use crate::output::{OutputSink, Stream};

type Line = (Stream, String);

/// Relay every line the child writes, then wait for it to exit.
///
/// Returns once both pipes reached end-of-file and the exit code is known.
pub async fn relay(child: LaunchedChild, sink: &mut OutputSink) -> Result<i32, Error> {
    let LaunchedChild {
        pid,
        stdout,
        stderr,
        exit,
    } = child;

    let (tx, mut rx) = mpsc::unbounded_channel::<Line>();
    tokio::spawn(read_lines(stdout, Stream::Stdout, tx.clone()));
    tokio::spawn(read_lines(stderr, Stream::Stderr, tx));

    while let Some((stream, text)) = rx.recv().await {
        sink.write_line(stream, &text)?;
    }

    let code = exit
        .await
        .map_err(|e| Error::Wait(io::Error::other(e)))?
        .map_err(Error::Wait)?;
    debug!("child {pid} exited with code {code}");
    Ok(code)
}

async fn read_lines(pipe: OutputPipe, stream: Stream, tx: mpsc::UnboundedSender<Line>) {
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if tx.send((stream, decode_line(&buf))).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => break,
            Err(e) => {
                warn!("error reading child {stream}: {e}");
                break;
            }
        }
    }
}

/// Strip the line terminator (`\n` or `\r\n`); invalid UTF-8 is replaced.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Console;
    use crate::test_utils::SharedBuffer;

    fn child(stdout: &'static [u8], stderr: &'static [u8], code: i32) -> LaunchedChild {
        LaunchedChild {
            pid: 1,
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            exit: tokio::spawn(async move { Ok(code) }),
        }
    }

    fn transcript_sink() -> (OutputSink, tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let console = Console::new(
            Box::new(SharedBuffer::default()),
            Box::new(SharedBuffer::default()),
        );
        let sink = OutputSink::start(console, Some(&path), "status").unwrap();
        (sink, dir, path)
    }

    #[test]
    fn test_decode_line() {
        assert_eq!(decode_line(b"hello\n"), "hello");
        assert_eq!(decode_line(b"hello\r\n"), "hello");
        assert_eq!(decode_line(b"no newline"), "no newline");
        assert_eq!(decode_line(b"\n"), "");
        assert_eq!(decode_line(b"bad \xff byte\n"), "bad \u{fffd} byte");
    }

    #[tokio::test]
    async fn test_relay_forwards_lines_and_exit_code() {
        let (mut sink, _dir, path) = transcript_sink();
        let code = relay(child(b"one\r\ntwo\n\nthree", b"warn\n", 7), &mut sink)
            .await
            .unwrap();
        sink.finish().unwrap();
        assert_eq!(code, 7);

        let transcript = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = transcript.lines().collect();
        assert_eq!(lines[0], "status");
        let stdout: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|l| !l.starts_with("ERROR: ") && *l != "status")
            .collect();
        assert_eq!(stdout, vec!["one", "two", "three"]);
        assert!(lines.contains(&"ERROR: warn"));
    }

    #[tokio::test]
    async fn test_relay_wait_failure() {
        let (mut sink, _dir, _path) = transcript_sink();
        let mut launched = child(b"", b"", 0);
        launched.exit = tokio::spawn(async { Err(io::Error::other("gone")) });
        let err = relay(launched, &mut sink).await.unwrap_err();
        assert!(matches!(err, Error::Wait(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_relay_real_child() {
        use crate::cli::InvocationRequest;
        use crate::credential::{Credential, Secret};
        use crate::launcher::{Launcher, LogonLauncher};
        use crate::test_utils::current_username;

        let request = InvocationRequest::parse(
            ["/bin/sh", "-c", "echo hello; sleep 0.1; echo oops >&2; sleep 0.1; echo bye; exit 42"]
                .iter()
                .map(|s| s.to_string()),
        )
        .unwrap();
        let credential = Credential::new(current_username(), Secret::from("x"));
        let launched = LogonLauncher.launch(&request, &credential).unwrap();

        let (mut sink, _dir, path) = transcript_sink();
        let code = relay(launched, &mut sink).await.unwrap();
        sink.exit_code(code).unwrap();
        sink.finish().unwrap();

        assert_eq!(code, 42);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "status\nhello\nERROR: oops\nbye\nProcess exited with code: 42\n"
        );
    }
}
