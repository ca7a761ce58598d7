// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use log::{debug, info, warn};

use crate::cli::InvocationRequest;
use crate::errors::Error;
use crate::launcher::Launcher;
use crate::output::{Console, OutputSink};
use crate::prompt::{Prompter, collect_credential};
use crate::relay::relay;

/// Run one invocation end to end and return the child's exit code.
///
/// Credentials are collected first; nothing is launched if they are
/// incomplete. The password is dropped, and wiped, as soon as the launch
/// call returns.
pub async fn run<L, P>(
    request: &InvocationRequest,
    launcher: &L,
    prompter: &mut P,
    console: Console,
) -> Result<i32, Error>
where
    L: Launcher + ?Sized,
    P: Prompter + ?Sized,
{
    let credential = collect_credential(request.target_user(), prompter)?;

    let mut sink = OutputSink::start(
        console,
        request.output_path(),
        &request.status_line(credential.account()),
    )?;

    let launched = launcher.launch(request, &credential);
    drop(credential);

    let child = match launched {
        Ok(child) => child,
        Err(e) => {
            if let Err(finish_err) = sink.finish() {
                warn!("failed to close output after launch failure: {finish_err}");
            }
            return Err(e);
        }
    };

    let code = relay(child, &mut sink).await?;
    info!("process exited with code {code}");
    sink.exit_code(code)?;
    sink.finish()?;
    debug!("run complete");
    Ok(code)
}
