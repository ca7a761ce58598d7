// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};

use log::{debug, warn};
use tokio::process::Command;
use uzers::os::unix::UserExt;

use super::LaunchedChild;
use crate::cli::InvocationRequest;
use crate::credential::Credential;
use crate::errors::{Error, FAILURE_EXIT_CODE};

pub(super) fn launch(
    request: &InvocationRequest,
    credential: &Credential,
) -> Result<LaunchedChild, Error> {
    let launch_error = |source: io::Error| Error::Launch {
        command: request.command().to_string(),
        source,
    };

    if !credential.domain().is_empty() {
        warn!(
            "ignoring domain '{}', accounts are resolved locally",
            credential.domain()
        );
    }

    let account = uzers::get_user_by_name(credential.username()).ok_or_else(|| {
        launch_error(io::Error::new(
            io::ErrorKind::NotFound,
            format!("unknown user '{}'", credential.username()),
        ))
    })?;

    let mut cmd = Command::new(request.command());
    cmd.args(request.arguments())
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .env("HOME", account.home_dir())
        .env("USER", account.name())
        .env("LOGNAME", account.name())
        .env("SHELL", account.shell());

    if account.uid() != uzers::get_effective_uid() {
        debug!(
            "switching to uid={} gid={}",
            account.uid(),
            account.primary_group_id()
        );
        cmd.uid(account.uid()).gid(account.primary_group_id());
    }

    let mut child = cmd.spawn().map_err(launch_error)?;
    let pid = child.id().unwrap_or(0);
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| launch_error(io::Error::other("stdout was not captured")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| launch_error(io::Error::other("stderr was not captured")))?;

    let exit = tokio::spawn(async move { child.wait().await.map(exit_code) });

    Ok(LaunchedChild {
        pid,
        stdout: Box::new(stdout),
        stderr: Box::new(stderr),
        exit,
    })
}

/// Exit code of the child; a signal `n` maps to `128 + n` like shells do.
fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(FAILURE_EXIT_CODE)
}
