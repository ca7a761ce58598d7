// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::ffi::OsStr;
use std::fs::File;
use std::io;
use std::iter;
use std::mem;
use std::os::windows::ffi::OsStrExt;
use std::os::windows::io::{AsRawHandle, FromRawHandle, OwnedHandle};
use std::ptr;

use log::debug;
use windows_sys::Win32::Foundation::{
    HANDLE, HANDLE_FLAG_INHERIT, SetHandleInformation, WAIT_OBJECT_0,
};
use windows_sys::Win32::Security::SECURITY_ATTRIBUTES;
use windows_sys::Win32::System::Console::{GetStdHandle, STD_INPUT_HANDLE};
use windows_sys::Win32::System::Pipes::CreatePipe;
use windows_sys::Win32::System::Threading::{
    CREATE_UNICODE_ENVIRONMENT, CreateProcessWithLogonW, GetExitCodeProcess,
    INFINITE, LOGON_WITH_PROFILE, PROCESS_INFORMATION, STARTF_USESTDHANDLES, STARTUPINFOW,
    WaitForSingleObject,
};

use super::LaunchedChild;
use crate::cli::InvocationRequest;
use crate::credential::Credential;
use crate::errors::Error;

/// Anonymous pipe whose write end is handed to the child.
struct Pipe {
    read: OwnedHandle,
    write: OwnedHandle,
}

fn output_pipe() -> io::Result<Pipe> {
    let attrs = SECURITY_ATTRIBUTES {
        nLength: mem::size_of::<SECURITY_ATTRIBUTES>() as u32,
        lpSecurityDescriptor: ptr::null_mut(),
        bInheritHandle: 1,
    };
    let mut read: HANDLE = ptr::null_mut();
    let mut write: HANDLE = ptr::null_mut();

    // SAFETY: the out-pointers and attributes are valid for the call.
    if unsafe { CreatePipe(&mut read, &mut write, &attrs, 0) } == 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: CreatePipe succeeded, both handles are open and owned by nobody else.
    let pipe = unsafe {
        Pipe {
            read: OwnedHandle::from_raw_handle(read),
            write: OwnedHandle::from_raw_handle(write),
        }
    };

    // Only the write end may be inherited by the child.
    // SAFETY: the read handle is open for the lifetime of `pipe`.
    if unsafe { SetHandleInformation(pipe.read.as_raw_handle(), HANDLE_FLAG_INHERIT, 0) } == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(pipe)
}

fn wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(iter::once(0)).collect()
}

/// `<command> <arguments>`, with the command quoted when it contains a space.
fn command_line(request: &InvocationRequest) -> String {
    let command = request.command();
    let command = if command.contains(' ') {
        format!("\"{command}\"")
    } else {
        command.to_string()
    };
    let arguments = request.argument_line();
    if arguments.is_empty() {
        command
    } else {
        format!("{command} {arguments}")
    }
}

pub(super) fn launch(
    request: &InvocationRequest,
    credential: &Credential,
) -> Result<LaunchedChild, Error> {
    let launch_error = |source: io::Error| Error::Launch {
        command: request.command().to_string(),
        source,
    };

    let stdout = output_pipe().map_err(launch_error)?;
    let stderr = output_pipe().map_err(launch_error)?;

    // SAFETY: STARTUPINFOW is plain data; all-zero is its documented empty value.
    let mut startup: STARTUPINFOW = unsafe { mem::zeroed() };
    startup.cb = mem::size_of::<STARTUPINFOW>() as u32;
    startup.dwFlags = STARTF_USESTDHANDLES;
    // SAFETY: GetStdHandle has no preconditions.
    startup.hStdInput = unsafe { GetStdHandle(STD_INPUT_HANDLE) };
    startup.hStdOutput = stdout.write.as_raw_handle();
    startup.hStdError = stderr.write.as_raw_handle();

    let username = wide(credential.username());
    let domain = wide(credential.domain());
    let mut cmdline = wide(&command_line(request));
    debug!("command line: {}", command_line(request));

    // SAFETY: PROCESS_INFORMATION is plain data filled in by the call.
    let mut info: PROCESS_INFORMATION = unsafe { mem::zeroed() };
    let created = {
        let password = credential.secret().to_wide();
        // SAFETY: every string is NUL-terminated and outlives the call,
        // `cmdline` is writable as required, and the structs are initialised.
        unsafe {
            CreateProcessWithLogonW(
                username.as_ptr(),
                domain.as_ptr(),
                password.as_ptr(),
                LOGON_WITH_PROFILE,
                ptr::null(),
                cmdline.as_mut_ptr(),
                CREATE_UNICODE_ENVIRONMENT,
                ptr::null(),
                ptr::null(),
                &startup,
                &mut info,
            )
        }
    };
    if created == 0 {
        return Err(launch_error(io::Error::last_os_error()));
    }

    // SAFETY: the call succeeded, so both handles are open and now ours.
    let (process, thread) = unsafe {
        (
            OwnedHandle::from_raw_handle(info.hProcess),
            OwnedHandle::from_raw_handle(info.hThread),
        )
    };
    drop(thread);
    // The child holds its own copies; ours must close for EOF to arrive.
    drop(stdout.write);
    drop(stderr.write);

    let exit = tokio::task::spawn_blocking(move || wait_for_exit(&process));

    Ok(LaunchedChild {
        pid: info.dwProcessId,
        stdout: Box::new(tokio::fs::File::from_std(File::from(stdout.read))),
        stderr: Box::new(tokio::fs::File::from_std(File::from(stderr.read))),
        exit,
    })
}

fn wait_for_exit(process: &OwnedHandle) -> io::Result<i32> {
    // SAFETY: the handle stays open for the lifetime of `process`.
    if unsafe { WaitForSingleObject(process.as_raw_handle(), INFINITE) } != WAIT_OBJECT_0 {
        return Err(io::Error::last_os_error());
    }
    let mut code: u32 = 0;
    // SAFETY: as above; `code` is a valid out-pointer.
    if unsafe { GetExitCodeProcess(process.as_raw_handle(), &mut code) } == 0 {
        return Err(io::Error::last_os_error());
    }
    // NTSTATUS-style codes keep their bit pattern.
    Ok(i32::from_ne_bytes(code.to_ne_bytes()))
}
