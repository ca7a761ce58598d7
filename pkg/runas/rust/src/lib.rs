// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::undocumented_unsafe_blocks)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Tests are allowed to panic on failure
#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)
)]

pub mod cli;
pub mod config;
pub mod credential;
pub mod errors;
pub mod launcher;
pub mod output;
pub mod prompt;
pub mod relay;
pub mod runner;

#[cfg(test)]
pub(crate) mod test_utils;

pub use cli::{InvocationRequest, USAGE};
pub use credential::{Credential, Secret};
pub use errors::Error;
pub use launcher::{Launcher, LogonLauncher};
pub use output::{Console, OutputSink};
pub use prompt::{ConsolePrompter, Prompter};
pub use runner::run;
