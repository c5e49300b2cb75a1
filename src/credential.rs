// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;

/// Upstream API key, read once at startup and passed to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep the secret out of logs.
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Reads the first line of `path`, trailing whitespace stripped.
pub fn read_api_key(path: &Path) -> Result<ApiKey> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read API key file: {}", path.display()))?;

    let key = contents.lines().next().unwrap_or("").trim_end();
    if key.is_empty() {
        anyhow::bail!("API key file is empty: {}", path.display());
    }

    Ok(ApiKey::new(key))
}
