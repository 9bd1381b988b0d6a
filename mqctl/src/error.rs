use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Resource family an error refers to, used in user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Queue,
    Pool,
    Flavor,
    Claim,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Queue => write!(f, "queue"),
            ResourceKind::Pool => write!(f, "pool"),
            ResourceKind::Flavor => write!(f, "flavor"),
            ResourceKind::Claim => write!(f, "claim"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{kind} '{name}' not found")]
    NotFound { kind: ResourceKind, name: String },

    #[error("server returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MessagingError>;

// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{kind} '{name}' does not exist")]
    NotFound { kind: ResourceKind, name: String },

    #[error("{what} is not valid JSON: {source}")]
    InvalidJson {
        what: String,
        source: serde_json::Error,
    },

    #[error("messaging client error: {0}")]
    Client(#[from] MessagingError),
}
