// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Starting the child process under another identity.
//!
//! - Windows: `CreateProcessWithLogonW` with the user's profile loaded.
//! - Unix: the account is resolved locally and the child runs with its
//!   uid/gid and login environment. Switching to another account requires
//!   the caller to be privileged.

use std::io;

use log::{error, info};
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;

use crate::cli::InvocationRequest;
use crate::credential::Credential;
use crate::errors::Error;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as platform;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as platform;

pub type OutputPipe = Box<dyn AsyncRead + Send + Unpin>;

/// A started child: its output pipes and a task resolving to its exit code.
pub struct LaunchedChild {
    pub pid: u32,
    pub stdout: OutputPipe,
    pub stderr: OutputPipe,
    pub exit: JoinHandle<io::Result<i32>>,
}

pub trait Launcher {
    /// Start `request` as `credential`. Must be called from within a tokio
    /// runtime.
    fn launch(
        &self,
        request: &InvocationRequest,
        credential: &Credential,
    ) -> Result<LaunchedChild, Error>;
}

/// Launches through the operating system's logon facilities.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogonLauncher;

impl Launcher for LogonLauncher {
    fn launch(
        &self,
        request: &InvocationRequest,
        credential: &Credential,
    ) -> Result<LaunchedChild, Error> {
        info!(
            "launching {} as user={} domain={}",
            request.command(),
            credential.username(),
            credential.domain()
        );
        match platform::launch(request, credential) {
            Ok(child) => {
                info!("spawned (pid={}, cmd={})", child.pid, request.command());
                Ok(child)
            }
            Err(e) => {
                error!("launch failed: {e}");
                Err(e)
            }
        }
    }
}
