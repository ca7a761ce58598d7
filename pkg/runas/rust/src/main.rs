// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]

use std::env;
use std::io::{self, Write};
use std::process;

use anyhow::{Context, Result};
use log::{debug, info};
use simple_logger::SimpleLogger;

use runas_cmd::config;
use runas_cmd::errors::FAILURE_EXIT_CODE;
use runas_cmd::output::append_best_effort;
use runas_cmd::{Console, ConsolePrompter, Error, InvocationRequest, LogonLauncher, USAGE, run};

/// Last-chance console write. The reader may be gone; the exit code still
/// has to reach the caller, so write errors are dropped.
fn say(line: &str) {
    let mut stdout = io::stdout();
    let _ = writeln!(stdout, "{line}").and_then(|_| stdout.flush());
}

fn print_usage(missing_command: bool) {
    if missing_command {
        say(&format!("Error: {}\n", Error::MissingCommand));
    }
    say(USAGE);
}

/// Map a failed run onto the console (and transcript) the way users expect.
fn report(request: &InvocationRequest, err: &Error) {
    if err.is_input_error() {
        say(&err.to_string());
        return;
    }
    let line = format!("Error: {err}");
    say(&line);
    if let Some(path) = request.output_path() {
        append_best_effort(path, &line);
    }
}

fn run_tool() -> Result<i32> {
    let log_level = config::get_log_level();
    SimpleLogger::new()
        .with_level(log_level)
        .init()
        .context("Failed to initialize logger")?;
    debug!("Log level set to: {log_level:?}");

    let request = match InvocationRequest::parse(env::args().skip(1)) {
        Ok(request) => request,
        Err(e) => {
            print_usage(matches!(e, Error::MissingCommand));
            return Ok(e.exit_code());
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build async runtime")?;

    let mut prompter = ConsolePrompter;
    let result = runtime.block_on(run(
        &request,
        &LogonLauncher,
        &mut prompter,
        Console::stdio(),
    ));

    match result {
        Ok(code) => {
            info!("Exiting with code {code}");
            Ok(code)
        }
        Err(e) => {
            report(&request, &e);
            Ok(e.exit_code())
        }
    }
}

fn main() {
    let code = run_tool().unwrap_or_else(|e| {
        let _ = writeln!(io::stderr(), "Error: {e:#}");
        FAILURE_EXIT_CODE
    });
    process::exit(code);
}
