// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use thiserror::Error;

/// Exit status used for every failure of the tool itself.
pub const FAILURE_EXIT_CODE: i32 = 1;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no arguments given")]
    NoArguments,

    #[error("Command not provided.")]
    MissingCommand,

    #[error("Username cannot be empty.")]
    EmptyUsername,

    #[error("Password cannot be empty.")]
    EmptyPassword,

    #[error("password entry was cancelled")]
    PromptCancelled,

    #[error("could not read from the terminal: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("failed to start '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for the child process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        FAILURE_EXIT_CODE
    }

    /// Usage and input errors are printed as-is. Everything else is a runtime
    /// failure reported as `Error: <message>` and mirrored to the transcript.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::NoArguments
                | Error::MissingCommand
                | Error::EmptyUsername
                | Error::EmptyPassword
                | Error::PromptCancelled
        )
    }
}
