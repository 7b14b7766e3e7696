//! Dashboard reconciliation for one stack and one binding.

use std::fmt;
use std::path::Path;

use dashpub_client::{CloudApi, StackSession};
use dashpub_core::{DashboardBinding, Folder, PublisherConfig, Stack};

use crate::document::DashboardDocument;
use crate::error::{io_err, SyncError};
use crate::folders::resolve_folder;
use crate::session::SessionGuard;
use crate::storage::DashboardStore;
use crate::transform::{transform, TransformOptions};

/// Which target set a binding publishes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingClass {
    /// Every selected stack.
    Shared,
    /// The designated custom stack only.
    Custom,
}

impl fmt::Display for BindingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingClass::Shared => f.write_str("shared"),
            BindingClass::Custom => f.write_str("custom"),
        }
    }
}

/// A local folder paired with a destination folder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub class: BindingClass,
    pub folders: DashboardBinding,
}

impl Binding {
    pub fn new(class: BindingClass, folders: &DashboardBinding) -> Self {
        Self {
            class,
            folders: folders.clone(),
        }
    }

    pub fn local_folder(&self) -> &Path {
        &self.folders.local_folder
    }

    pub fn grafana_folder(&self) -> &str {
        &self.folders.grafana_folder
    }

    pub fn is_configured(&self) -> bool {
        self.folders.is_configured()
    }
}

/// Run-scoped settings shared by every stack and binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub root_folder: Vec<String>,
    pub transform: TransformOptions,
}

impl From<&PublisherConfig> for ReconcileOptions {
    fn from(config: &PublisherConfig) -> Self {
        Self {
            root_folder: config.root_folder_segments(),
            transform: TransformOptions::from(config),
        }
    }
}

/// What one successful stack pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackReport {
    pub uploaded: usize,
    pub deleted: usize,
    /// `.deleted` markers whose dashboard was not on the stack.
    pub already_absent: usize,
}

enum FileAction {
    Upload,
    Delete,
}

fn action_for(path: &Path) -> Result<FileAction, SyncError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(FileAction::Upload),
        Some("deleted") => Ok(FileAction::Delete),
        other => Err(SyncError::UnsupportedExtension {
            path: path.to_path_buf(),
            extension: other.unwrap_or_default().to_string(),
        }),
    }
}

pub struct Reconciler<'a> {
    cloud: &'a dyn CloudApi,
    store: &'a dyn DashboardStore,
    options: &'a ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        cloud: &'a dyn CloudApi,
        store: &'a dyn DashboardStore,
        options: &'a ReconcileOptions,
    ) -> Self {
        Self {
            cloud,
            store,
            options,
        }
    }

    /// Whether the binding's local folder exists.
    pub fn local_folder_present(&self, binding: &Binding) -> Result<bool, SyncError> {
        let entry = self
            .store
            .stat(binding.local_folder())
            .map_err(|e| io_err(binding.local_folder(), e))?;
        Ok(entry.is_some())
    }

    /// Bring `binding`'s destination folder on `stack` in line with the
    /// local files. The stack session is released before returning.
    pub fn reconcile_stack(&self, stack: &Stack, binding: &Binding) -> Result<StackReport, SyncError> {
        let session = SessionGuard::open(self.cloud, stack)?;
        let folder = resolve_folder(&*session, &self.options.root_folder, binding.grafana_folder())?;

        let files = self
            .store
            .walk_files(binding.local_folder())
            .map_err(|e| io_err(binding.local_folder(), e))?;

        let mut report = StackReport::default();
        for path in &files {
            match action_for(path)? {
                FileAction::Upload => {
                    tracing::info!(stack = %stack.slug, dashboard = %path.display(), "syncing dashboard");
                    self.upload(&*session, stack, &folder, path)?;
                    report.uploaded += 1;
                }
                FileAction::Delete => {
                    tracing::info!(stack = %stack.slug, dashboard = %path.display(), "deleting dashboard");
                    if self.delete(&*session, path)? {
                        report.deleted += 1;
                    } else {
                        report.already_absent += 1;
                    }
                }
            }
        }
        Ok(report)
    }

    fn read_document(&self, path: &Path) -> Result<DashboardDocument, SyncError> {
        let bytes = self.store.read(path).map_err(|e| io_err(path, e))?;
        DashboardDocument::from_slice(&bytes).map_err(|source| SyncError::Document {
            path: path.to_path_buf(),
            source,
        })
    }

    fn upload(
        &self,
        session: &dyn StackSession,
        stack: &Stack,
        folder: &Folder,
        path: &Path,
    ) -> Result<(), SyncError> {
        let document = self.read_document(path)?;
        let upload = transform(document, stack, folder, &self.options.transform, session)
            .map_err(|source| SyncError::Transform {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(
            uid = %upload.uid,
            title = upload.title().unwrap_or_default(),
            folder = %upload.folder_uid,
            "uploading dashboard"
        );
        session
            .upload_dashboard(&upload)
            .map_err(|source| SyncError::Upload {
                uid: upload.uid.clone(),
                path: path.to_path_buf(),
                source,
            })
    }

    /// Delete the dashboard named by a `.deleted` marker. Returns `false`
    /// when it was already absent.
    fn delete(&self, session: &dyn StackSession, path: &Path) -> Result<bool, SyncError> {
        let document = self.read_document(path)?;
        let uid = document.uid().map_err(|source| SyncError::Document {
            path: path.to_path_buf(),
            source,
        })?;

        let existing = session.get_dashboard(uid).map_err(|source| SyncError::Lookup {
            uid: uid.to_string(),
            source,
        })?;
        if existing.is_none() {
            tracing::debug!(uid, "dashboard already absent");
            return Ok(false);
        }

        session
            .delete_dashboard(uid)
            .map_err(|source| SyncError::Delete {
                uid: uid.to_string(),
                source,
            })?;
        Ok(true)
    }
}
