// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::errors::Error;

const STDERR_PREFIX: &str = "ERROR: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => write!(f, "stdout"),
            Stream::Stderr => write!(f, "stderr"),
        }
    }
}

/// The tool's own standard output and error.
pub struct Console {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

impl Console {
    pub fn new(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self { out, err }
    }

    pub fn stdio() -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    fn println(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    fn eprintln(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.err, "{line}")?;
        self.err.flush()
    }
}

struct Transcript {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Transcript {
    fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }
}

/// Where the status lines and the child's output end up: the console, or a
/// transcript file when one could be opened.
pub struct OutputSink {
    console: Console,
    transcript: Option<Transcript>,
}

impl OutputSink {
    /// Announce the run on the console and, if `path` is set, start a
    /// transcript with the same status line.
    ///
    /// A transcript that cannot be created is reported and the run falls back
    /// to console output.
    pub fn start(mut console: Console, path: Option<&Path>, status: &str) -> Result<Self, Error> {
        console
            .println(&format!("\n{status}\n"))
            .map_err(Error::Output)?;

        let transcript = match path {
            None => None,
            Some(path) => match Transcript::create(path) {
                Ok(mut transcript) => {
                    transcript.write_line(status).map_err(Error::Output)?;
                    debug!("writing transcript to {}", path.display());
                    Some(transcript)
                }
                Err(e) => {
                    warn!("failed to create transcript {}: {e}", path.display());
                    console
                        .println(&format!(
                            "Warning: Could not open output file '{}': {e}",
                            path.display()
                        ))
                        .and_then(|_| console.println("Output will be displayed on console only."))
                        .map_err(Error::Output)?;
                    None
                }
            },
        };

        Ok(Self {
            console,
            transcript,
        })
    }

    #[cfg(test)]
    fn has_transcript(&self) -> bool {
        self.transcript.is_some()
    }

    /// Record one line of child output. Empty lines are dropped.
    pub fn write_line(&mut self, stream: Stream, text: &str) -> Result<(), Error> {
        if text.is_empty() {
            return Ok(());
        }
        let result = match (&mut self.transcript, stream) {
            (Some(transcript), Stream::Stdout) => transcript.write_line(text),
            (Some(transcript), Stream::Stderr) => {
                transcript.write_line(&format!("{STDERR_PREFIX}{text}"))
            }
            (None, Stream::Stdout) => self.console.println(text),
            (None, Stream::Stderr) => self.console.eprintln(text),
        };
        result.map_err(Error::Output)
    }

    pub fn exit_code(&mut self, code: i32) -> Result<(), Error> {
        let line = format!("Process exited with code: {code}");
        let result = match &mut self.transcript {
            Some(transcript) => transcript.write_line(&line),
            None => self.console.println(&format!("\n{line}")),
        };
        result.map_err(Error::Output)
    }

    /// Close the transcript, if any, and say where it was written.
    pub fn finish(mut self) -> Result<(), Error> {
        if let Some(mut transcript) = self.transcript.take() {
            transcript.writer.flush().map_err(Error::Output)?;
            drop(transcript.writer);
            self.console
                .println(&format!("Output written to: {}", transcript.path.display()))
                .map_err(Error::Output)?;
        }
        Ok(())
    }
}

/// Append `line` to the file at `path`, ignoring any failure.
pub fn append_best_effort(path: &Path, line: &str) {
    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| writeln!(file, "{line}"));
    if let Err(e) = result {
        debug!("could not append to {}: {e}", path.display());
    }
}
