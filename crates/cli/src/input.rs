//! Argument decoding and stdout helpers.

use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors decoding a JSON argument.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode a JSON argument given inline or as `@path`.
pub fn json_arg<T: DeserializeOwned>(raw: &str) -> Result<T, InputError> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path)).map_err(|source| InputError::Read {
            path: path.to_string(),
            source,
        })?,
        None => raw.to_string(),
    };
    Ok(serde_json::from_str(&text)?)
}

/// Write one line to stdout.
pub fn emit(line: impl std::fmt::Display) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{line}")
}
