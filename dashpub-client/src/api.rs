//! Capability traits the publisher engine depends on.

use dashpub_core::{Datasource, DashboardUpload, Folder, Stack, Stacks};
use serde_json::Value;

use crate::error::ClientError;

/// Account-level API: enumerates stacks and hands out per-stack sessions.
pub trait CloudApi {
    /// Every stack visible to the account credential.
    fn list_stacks(&self) -> Result<Stacks, ClientError>;

    /// Acquire a session scoped to `stack`.
    ///
    /// The returned session holds remote resources (a temporary service
    /// account); callers must invoke [`StackSession::cleanup`] when done.
    fn open_session(&self, stack: &Stack) -> Result<Box<dyn StackSession>, ClientError>;
}

/// Operations available within one stack.
pub trait StackSession {
    /// Fetch-or-create the folder titled `name` under `parent` (top level when
    /// `None`). Lookup is by exact title within the parent scope.
    fn ensure_folder(&self, parent: Option<&Folder>, name: &str) -> Result<Folder, ClientError>;

    fn get_datasource(&self, name: &str) -> Result<Datasource, ClientError>;

    /// Create or wholesale replace the dashboard (`overwrite = true`).
    fn upload_dashboard(&self, dashboard: &DashboardUpload) -> Result<(), ClientError>;

    /// The stored dashboard document, or `None` if no dashboard has `uid`.
    fn get_dashboard(&self, uid: &str) -> Result<Option<Value>, ClientError>;

    fn delete_dashboard(&self, uid: &str) -> Result<(), ClientError>;

    /// Release the session's remote resources.
    fn cleanup(&mut self) -> Result<(), ClientError>;
}
