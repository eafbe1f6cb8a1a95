//! Document loading from files, strings and raw bytes.

use std::path::Path;

use serde_json::Value;

use crate::error::Error;

/// Load a JSON document from a file path.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the file doesn't exist,
/// or `Error::InvalidJson` if the file isn't valid JSON.
pub fn load_document(path: &Path) -> Result<Value, Error> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read(path).map_err(|source| Error::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_document_slice(&content)
}

/// Load a JSON document from a string.
///
/// # Errors
///
/// Returns `Error::InvalidJson` if the string isn't valid JSON.
pub fn load_document_str(content: &str) -> Result<Value, Error> {
    serde_json::from_str(content).map_err(|source| Error::InvalidJson { source })
}

pub(crate) fn load_document_slice(content: &[u8]) -> Result<Value, Error> {
    serde_json::from_slice(content).map_err(|source| Error::InvalidJson { source })
}
