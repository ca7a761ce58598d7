// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::Error;

pub const USAGE: &str = r#"RunAsCmd - Execute Commands as Another User

Usage: runas-cmd [-u username] [-o outputfile] <command> [arguments]

Options:
  -u, -user, /u, /u:username    Username to run command as (DOMAIN\user or user)
                                 If omitted, you will be prompted for username
  -o, --output, /o, /o:file     Output file path (writes output to file instead of console)

Examples:
  runas-cmd -u DOMAIN\User cmd.exe /c dir
  runas-cmd /u:DOMAIN\User powershell.exe -Command "Get-Process"

Write output to file:
  runas-cmd -u DOMAIN\User -o output.txt cmd.exe /c dir
  runas-cmd -u DOMAIN\User /o:C:\logs\result.txt cmd.exe /c dir

Kill a process on a remote computer using psexec:
  runas-cmd -u DOMAIN\Admin -o result.txt psexec.exe \\RemotePC -u DOMAIN\User taskkill /F /IM notepad.exe

Kill a process by PID on remote computer:
  runas-cmd -u DOMAIN\Admin psexec.exe \\RemotePC -u DOMAIN\User taskkill /F /PID 1234

Kill multiple processes on remote computer:
  runas-cmd -u DOMAIN\Admin psexec.exe \\RemotePC -u DOMAIN\User taskkill /F /IM notepad.exe /IM calc.exe"#;

/// A fully parsed command line: who to run as, where to write output, and
/// the command tail passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    command: String,
    arguments: Vec<String>,
    target_user: Option<String>,
    output_path: Option<PathBuf>,
}

impl InvocationRequest {
    /// Parse the process arguments, program name excluded.
    ///
    /// Flags are matched case-insensitively anywhere in the list. A flag that
    /// takes its value from the next token but is the last token is kept as
    /// a positional argument.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, Error> {
        let args: Vec<String> = args.into_iter().collect();
        if args.is_empty() {
            return Err(Error::NoArguments);
        }

        let mut target_user = None;
        let mut output_path = None;
        let mut remaining = Vec::new();
        let mut tokens = args.into_iter();

        while let Some(arg) = tokens.next() {
            let lower = arg.to_lowercase();

            if matches!(lower.as_str(), "-u" | "-user" | "/u") {
                if let Some(value) = tokens.next() {
                    target_user = Some(value);
                    continue;
                }
            } else if lower.starts_with("/u:") {
                target_user = arg.get(3..).map(str::to_string);
                continue;
            } else if matches!(lower.as_str(), "-o" | "--output" | "/o") {
                if let Some(value) = tokens.next() {
                    output_path = Some(PathBuf::from(value));
                    continue;
                }
            } else if lower.starts_with("/o:") || lower.starts_with("-o:") {
                if let Some((_, value)) = arg.split_once(':')
                    && !value.is_empty()
                {
                    output_path = Some(PathBuf::from(value));
                }
                continue;
            }

            remaining.push(arg);
        }

        let mut remaining = remaining.into_iter();
        let command = match remaining.next() {
            Some(command) if !command.trim().is_empty() => command,
            _ => return Err(Error::MissingCommand),
        };
        let arguments: Vec<String> = remaining.collect();

        debug!(
            "parsed command={command} args={} user_flag={} output={:?}",
            arguments.len(),
            target_user.is_some(),
            output_path
        );

        Ok(Self {
            command,
            arguments,
            target_user,
            output_path,
        })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn target_user(&self) -> Option<&str> {
        self.target_user.as_deref()
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Arguments joined with single spaces. Arguments containing a space are
    /// wrapped in double quotes; embedded quotes are left alone.
    pub fn argument_line(&self) -> String {
        self.arguments
            .iter()
            .map(|arg| {
                if arg.contains(' ') {
                    format!("\"{arg}\"")
                } else {
                    arg.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn status_line(&self, account: &str) -> String {
        format!(
            "Running '{} {}' as {account}...",
            self.command,
            self.argument_line()
        )
    }
}
