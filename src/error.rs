use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a channel run.
///
/// Per-asset failures during the download stage never surface as an `Error`;
/// they are reported through the event sink instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("empty channel identifier")]
    InvalidInput,

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("request to {url} failed with status {status}")]
    HttpStatus { url: String, status: StatusCode },

    #[error("could not resolve channel name {0:?} to an ID")]
    ResolutionFailed(String),

    #[error("invalid base URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
