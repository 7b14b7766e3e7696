//! Error types for dashpub-sync.

use std::path::PathBuf;

use thiserror::Error;

use dashpub_client::ClientError;
use dashpub_core::{ConfigError, StackSlug};

use crate::document::DocumentError;
use crate::transform::TransformError;

/// All errors that can arise from a publish run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to list stacks: {0}")]
    ListStacks(#[source] ClientError),

    /// A configured custom/test stack name matched no enumerated stack.
    #[error("stack {name:?} not found among enumerated (non-excluded) stacks")]
    UnknownStack { name: String },

    #[error("failed to get stack session for stack {stack}: {source}")]
    Session {
        stack: StackSlug,
        #[source]
        source: ClientError,
    },

    #[error("could not ensure folder {folder}: {source}")]
    Folder {
        folder: String,
        #[source]
        source: ClientError,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dashboard document {path}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    #[error("failed to prepare dashboard {path}: {source}")]
    Transform {
        path: PathBuf,
        #[source]
        source: TransformError,
    },

    #[error("unsupported file extension {extension:?} for path {path}")]
    UnsupportedExtension { path: PathBuf, extension: String },

    #[error("failed to upload dashboard {uid} ({path}): {source}")]
    Upload {
        uid: String,
        path: PathBuf,
        #[source]
        source: ClientError,
    },

    #[error("failed to look up dashboard {uid}: {source}")]
    Lookup {
        uid: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to delete dashboard {uid}: {source}")]
    Delete {
        uid: String,
        #[source]
        source: ClientError,
    },

    /// A stack failed both its first attempt and its retry.
    #[error("retry of stack {stack} failed: {source}")]
    RetryExhausted {
        stack: StackSlug,
        #[source]
        source: Box<SyncError>,
    },

    #[error("sync failed ({local_folder} -> {grafana_folder}): {source}")]
    Binding {
        local_folder: PathBuf,
        grafana_folder: String,
        #[source]
        source: Box<SyncError>,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
