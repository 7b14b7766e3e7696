//! Error types for dashpub-client.

use thiserror::Error;

/// All errors that can arise from remote API calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("{method} {url} failed: {message}")]
    Transport {
        method: &'static str,
        url: String,
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not set")]
    MissingCredential(&'static str),

    #[error("stack not found: {0}")]
    StackNotFound(String),

    #[error("invalid stack URL {url:?} for stack {stack}")]
    InvalidStackUrl { stack: String, url: String },

    #[error("folder {name} was created but never became visible")]
    FolderNotVisible { name: String },
}

impl ClientError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
