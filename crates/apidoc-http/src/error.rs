use apidoc_core::error::{LookupError, NormalizeError, ParseError};
use thiserror::Error;

use crate::executor::ExecutionResponse;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid load config: {0}")]
    InvalidConfig(&'static str),

    #[error("fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("fetching {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("nothing to reload: no spec has been loaded from a URL yet")]
    NothingToReload,
}

impl From<ParseError> for LoadError {
    fn from(err: ParseError) -> Self {
        LoadError::Normalize(err.into())
    }
}

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("no base URL: configure one or declare a server in the spec")]
    NoBaseUrl,

    #[error("invalid request URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header {0}")]
    InvalidHeader(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        response: Box<ExecutionResponse>,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request was aborted")]
    Aborted,

    #[error("failed to encode request body: {0}")]
    Body(String),
}

impl ExecuteError {
    /// HTTP status of the response, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ExecuteError::Http { status, .. } => Some(*status),
            ExecuteError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
