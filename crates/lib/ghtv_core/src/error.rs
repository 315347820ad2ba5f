use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised by ghtv.
///
/// Only `Client` and `CredentialFile` reach callers; request-level variants are
/// logged by the validator and folded into the outcome.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(reqwest::StatusCode),

    #[error("Response decode error: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Failed to read credentials from {}: {source}", path.display())]
    CredentialFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
