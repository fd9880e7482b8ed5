use std::path::PathBuf;

use bot_api::Endpoint;
use hyper::StatusCode;
use thiserror::Error;

/// Boxed failure of the underlying transport (connection, body read).
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config field `{field}` must be a positive integer")]
    NotPositive { field: &'static str },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build {endpoint} request")]
    Request {
        endpoint: Endpoint,
        #[source]
        source: hyper::http::Error,
    },
    #[error("failed to encode {endpoint} request body")]
    Encode {
        endpoint: Endpoint,
        #[source]
        source: TransportError,
    },
    #[error("{endpoint} request failed")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: TransportError,
    },
    #[error("{endpoint} rejected with {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: StatusCode,
        body: String,
    },
    #[error("unexpected {endpoint} response")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        match self {
            ApiError::Request { endpoint, .. }
            | ApiError::Encode { endpoint, .. }
            | ApiError::Transport { endpoint, .. }
            | ApiError::Status { endpoint, .. }
            | ApiError::Decode { endpoint, .. } => *endpoint,
        }
    }

    /// The rejecting status when the server answered with a non-success code.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("no posts available to like")]
    NoPostsToLike,
}

/// Failure of a whole run started from [`crate::RunSettings`].
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to load bot config")]
    Config(#[from] ConfigError),
    #[error("bot run aborted")]
    Bot(#[from] BotError),
}
