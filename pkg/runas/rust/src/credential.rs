// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Logon identity for the child process.
//!
//! The password lives in a [`Secret`], which is zeroed when dropped. It never
//! implements `Display` and its `Debug` output only reveals the length.

use std::fmt;

use zeroize::{Zeroize, Zeroizing};

const SECRET_CAPACITY: usize = 128;

/// Password buffer, filled one character at a time and zeroed on drop.
pub struct Secret {
    chars: Zeroizing<Vec<char>>,
}

impl Secret {
    pub fn new() -> Self {
        Self {
            chars: Zeroizing::new(Vec::with_capacity(SECRET_CAPACITY)),
        }
    }

    /// Append a character. The buffer never reallocates in place: when full,
    /// the contents move to a buffer twice the size and the old one is zeroed.
    pub fn push(&mut self, c: char) {
        if self.chars.len() == self.chars.capacity() {
            let capacity = (self.chars.capacity() * 2).max(SECRET_CAPACITY);
            let mut grown = Zeroizing::new(Vec::with_capacity(capacity));
            grown.extend_from_slice(&self.chars);
            self.chars = grown;
        }
        self.chars.push(c);
    }

    /// Remove the last character. Returns false when the buffer was empty.
    pub fn pop(&mut self) -> bool {
        match self.chars.last_mut() {
            Some(last) => {
                last.zeroize();
                self.chars.pop();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// NUL-terminated UTF-16 copy for the Win32 logon APIs.
    pub fn to_wide(&self) -> Zeroizing<Vec<u16>> {
        let mut wide = Zeroizing::new(Vec::with_capacity(self.chars.len() * 2 + 1));
        let mut buf = [0u16; 2];
        for c in self.chars.iter() {
            wide.extend_from_slice(c.encode_utf16(&mut buf));
        }
        buf.zeroize();
        wide.push(0);
        wide
    }
}

impl Default for Secret {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        let mut secret = Secret::new();
        value.chars().for_each(|c| secret.push(c));
        secret
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(*** {} chars ***)", self.chars.len())
    }
}

/// Split `DOMAIN\user` into its domain part.
///
/// The domain is everything before the first backslash, provided the
/// backslash is not the first character.
pub fn extract_domain(account: &str) -> &str {
    match account.find('\\') {
        Some(idx) if idx > 0 => account.get(..idx).unwrap_or_default(),
        _ => "",
    }
}

/// Split `DOMAIN\user` into its user part.
///
/// Everything after the first backslash, if there is a domain before it and
/// something after it. Otherwise the account is returned whole, so `\alice`
/// stays `\alice`.
pub fn extract_username(account: &str) -> &str {
    match account.find('\\') {
        Some(idx) if idx > 0 && idx + 1 < account.len() => {
            account.get(idx + 1..).unwrap_or(account)
        }
        _ => account,
    }
}

/// The identity a child is launched as.
#[derive(Debug)]
pub struct Credential {
    account: String,
    domain: String,
    username: String,
    secret: Secret,
}

impl Credential {
    pub fn new(account: impl Into<String>, secret: Secret) -> Self {
        let account = account.into();
        let domain = extract_domain(&account).to_string();
        let username = extract_username(&account).to_string();
        Self {
            account,
            domain,
            username,
            secret,
        }
    }

    /// The account exactly as it was entered, e.g. `CORP\alice`.
    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn secret(&self) -> &Secret {
        &self.secret
    }
}
