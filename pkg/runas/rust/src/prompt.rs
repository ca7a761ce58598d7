// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use log::{debug, warn};
use zeroize::Zeroizing;

use crate::credential::{Credential, Secret};
use crate::errors::Error;

const USERNAME_PROMPT: &str = "Enter username (DOMAIN\\username or username): ";
const PASSWORD_PROMPT: &str = "Enter password: ";
const MASK: &[u8] = b"*";
const ERASE_MASK: &[u8] = b"\x08 \x08";

/// Source of the interactive answers needed before a launch.
pub trait Prompter {
    fn username(&mut self) -> Result<String, Error>;
    fn password(&mut self) -> Result<Secret, Error>;
}

/// Build the credential for a run. The username is only asked for when it
/// was not given on the command line; the password is always asked for.
pub fn collect_credential<P: Prompter + ?Sized>(
    target_user: Option<&str>,
    prompter: &mut P,
) -> Result<Credential, Error> {
    let account = match target_user.filter(|u| !u.trim().is_empty()) {
        Some(user) => user.to_string(),
        None => {
            let user = prompter.username()?;
            if user.trim().is_empty() {
                return Err(Error::EmptyUsername);
            }
            user
        }
    };

    let secret = prompter.password()?;
    if secret.is_empty() {
        return Err(Error::EmptyPassword);
    }

    let credential = Credential::new(account, secret);
    debug!(
        "collected credential for user={} domain={}",
        credential.username(),
        credential.domain()
    );
    Ok(credential)
}

/// A keystroke as far as password entry is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Delete,
    Enter,
    Interrupt,
    Ignored,
}

impl From<KeyEvent> for Key {
    fn from(ev: KeyEvent) -> Self {
        let ctrl = ev.modifiers.contains(KeyModifiers::CONTROL);
        match ev.code {
            KeyCode::Char('c') if ctrl => Key::Interrupt,
            KeyCode::Char(_) if ctrl => Key::Ignored,
            KeyCode::Char(c) if !c.is_control() => Key::Char(c),
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Enter => Key::Enter,
            _ => Key::Ignored,
        }
    }
}

/// Consume keystrokes until Enter, echoing `*` for every character kept.
///
/// Backspace drops the last character and erases one mask from the display.
/// Running out of keys ends input like Enter does.
pub fn read_masked<I, W>(keys: I, echo: &mut W) -> Result<Secret, Error>
where
    I: IntoIterator<Item = io::Result<Key>>,
    W: Write + ?Sized,
{
    let mut secret = Secret::new();
    for key in keys {
        match key.map_err(Error::Prompt)? {
            Key::Char(c) => {
                secret.push(c);
                echo.write_all(MASK).map_err(Error::Prompt)?;
            }
            Key::Backspace => {
                if secret.pop() {
                    echo.write_all(ERASE_MASK).map_err(Error::Prompt)?;
                }
            }
            Key::Enter => break,
            Key::Interrupt => {
                echo.write_all(b"\r\n").map_err(Error::Prompt)?;
                echo.flush().map_err(Error::Prompt)?;
                return Err(Error::PromptCancelled);
            }
            Key::Delete | Key::Ignored => {}
        }
        echo.flush().map_err(Error::Prompt)?;
    }
    echo.write_all(b"\r\n").map_err(Error::Prompt)?;
    echo.flush().map_err(Error::Prompt)?;
    Ok(secret)
}

/// Key presses read from the terminal. Expects raw mode to be enabled.
struct TerminalKeys;

impl Iterator for TerminalKeys {
    type Item = io::Result<Key>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match event::read() {
                Ok(Event::Key(ev)) if ev.kind != KeyEventKind::Release => {
                    return Some(Ok(Key::from(ev)));
                }
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Prompts on the process console.
///
/// When standard input is not a terminal the password is read as one line
/// from it, without echo.
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl ConsolePrompter {
    fn read_masked_from_terminal(&self) -> Result<Secret, Error> {
        terminal::enable_raw_mode().map_err(Error::Prompt)?;
        let _restore = scopeguard::guard((), |_| {
            if let Err(e) = terminal::disable_raw_mode() {
                warn!("failed to restore terminal mode: {e}");
            }
        });
        read_masked(TerminalKeys, &mut io::stdout())
    }

    /// The line buffer is zeroed, but the bytes may remain in the process-wide
    /// `Stdin` buffer, which std never wipes. The username prompt reads
    /// through the same buffer, so it cannot be bypassed here.
    fn read_line_from_stdin(&self) -> Result<Secret, Error> {
        let secret = read_secret_line(&mut io::stdin().lock())?;
        writeln!(io::stdout()).map_err(Error::Prompt)?;
        Ok(secret)
    }
}

impl Prompter for ConsolePrompter {
    fn username(&mut self) -> Result<String, Error> {
        let mut stdout = io::stdout();
        stdout
            .write_all(USERNAME_PROMPT.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(Error::Prompt)?;

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(Error::Prompt)?;
        Ok(trim_line_ending(&line).to_string())
    }

    fn password(&mut self) -> Result<Secret, Error> {
        let mut stdout = io::stdout();
        stdout
            .write_all(PASSWORD_PROMPT.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(Error::Prompt)?;

        if io::stdin().is_terminal() {
            self.read_masked_from_terminal()
        } else {
            debug!("stdin is not a terminal, reading password as a line");
            self.read_line_from_stdin()
        }
    }
}

/// Read one line as a password. The intermediate line is zeroed on return.
fn read_secret_line<R: BufRead + ?Sized>(reader: &mut R) -> Result<Secret, Error> {
    let mut line = Zeroizing::new(String::with_capacity(128));
    reader.read_line(&mut line).map_err(Error::Prompt)?;
    Ok(Secret::from(trim_line_ending(&line)))
}

fn trim_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
