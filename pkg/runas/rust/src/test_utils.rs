// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Shared fixtures for unit tests
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::credential::Secret;
use crate::errors::Error;
use crate::prompt::Prompter;

/// In-memory writer whose contents stay readable after it has been boxed
/// into a [`crate::output::Console`].
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Answers prompts from fixed values and records what was asked.
pub struct ScriptedPrompter {
    username: Option<String>,
    password: String,
    pub username_asked: bool,
    pub password_asked: bool,
}

impl ScriptedPrompter {
    pub fn new(username: Option<&str>, password: &str) -> Self {
        Self {
            username: username.map(str::to_string),
            password: password.to_string(),
            username_asked: false,
            password_asked: false,
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn username(&mut self) -> Result<String, Error> {
        self.username_asked = true;
        Ok(self.username.clone().unwrap_or_default())
    }

    fn password(&mut self) -> Result<Secret, Error> {
        self.password_asked = true;
        Ok(Secret::from(self.password.as_str()))
    }
}

/// Name of the account running the tests, so launches need no privilege.
#[cfg(unix)]
pub fn current_username() -> String {
    uzers::get_current_username()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| panic!("current user has no passwd entry"))
}
