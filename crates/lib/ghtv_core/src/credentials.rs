//! Token file loading.

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Read a newline-delimited token file.
pub fn load_credentials(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|source| Error::CredentialFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_credentials(&contents))
}

/// Parse a token file's contents into a list of tokens.
///
/// Lines are trimmed and blank lines skipped; every other line is a token.
pub fn parse_credentials(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
