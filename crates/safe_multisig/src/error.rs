use std::{io, path::PathBuf};

/// Errors produced while building, signing and relaying Safe batches.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    /// A required setting is missing or no relay is known for the chain.
    Configuration(String),
    #[error("not found: {0}")]
    /// A lookup matched nothing, or a broadcast record has no transactions.
    NotFound(String),
    #[error("Expected 1 file, got {count} for {pattern}")]
    /// A lookup matched more than one file.
    AmbiguousMatch { pattern: String, count: usize },
    #[error("decode error: {0}")]
    /// Bytes or JSON did not match the expected schema.
    Decode(String),
    #[error("signer error: {0}")]
    /// The external signer rejected the request or failed.
    Signer(String),
    #[error("{0}")]
    /// The relay service answered with a non-success status.
    RemoteService(String),
    #[error("Failed to write signed batch to {path:?}: {source}")]
    /// The signed artifact could not be persisted.
    UnableToWriteFile { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl From<alloy_sol_types::Error> for Error {
    fn from(err: alloy_sol_types::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<alloy_dyn_abi::Error> for Error {
    fn from(err: alloy_dyn_abi::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<alloy_signer::Error> for Error {
    fn from(err: alloy_signer::Error) -> Self {
        Self::Signer(err.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
