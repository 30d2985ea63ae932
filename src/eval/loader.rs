//! Reading and writing result files.
//!
//! Result files are UTF-8 JSON objects mapping model ids to record lists.
//! Output is pretty-printed with two-space indentation and non-ASCII text
//! left unescaped.

use crate::{Error, Result};
use c3pa_core::ResultSet;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load a result file.
///
/// # Errors
///
/// Fails on unreadable files and on anything that is not a mapping of model
/// ids to record lists. There is no partial recovery.
pub fn read_result_set(path: &Path) -> Result<ResultSet> {
    read_json(path)
}

/// Write a result set in the same shape it was read in.
pub fn write_result_set(path: &Path, set: &ResultSet) -> Result<()> {
    write_json_pretty(path, set)
}

/// Deserialize a whole JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    serde_json::from_str(&content).map_err(|e| Error::json(path, e))
}

/// Serialize `value` as pretty JSON to `path`, replacing any existing file.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| Error::write(path, e))
}
