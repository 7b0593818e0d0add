use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenError>;

#[derive(Debug, Error)]
pub enum GenError {
    /// A count, length, range, wordlist or charset does not allow the requested operation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    /// The CSPRNG failed to produce bytes. Never retried.
    #[error("random source unavailable: {0}")]
    RandomSourceUnavailable(String),

    #[error("wordlist {path}: {source}")]
    Wordlist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config: {0}")]
    Config(String),
}

impl GenError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        GenError::InvalidConfiguration(message.into())
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        GenError::UnsupportedValue(message.into())
    }
}
