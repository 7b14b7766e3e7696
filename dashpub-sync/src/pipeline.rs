//! Publish run entrypoint used by the CLI.

use std::path::{Path, PathBuf};

use dashpub_client::{cloud_token, CloudApi, CloudClient, CLOUD_TOKEN_ENV};
use dashpub_core::{config, PublisherConfig};

use crate::error::SyncError;
use crate::reconciler::{Binding, BindingClass, ReconcileOptions, Reconciler};
use crate::retry::{run_with_retry, StackOutcome};
use crate::selector::{select, PublishMode, Targets};
use crate::storage::{DashboardStore, FsStore};

/// Outcome of one binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingStatus {
    /// Local or destination folder left blank.
    NotConfigured,
    LocalFolderMissing,
    Synced(Vec<StackOutcome>),
}

impl BindingStatus {
    /// Per-stack outcomes; empty for skipped bindings.
    pub fn outcomes(&self) -> &[StackOutcome] {
        match self {
            BindingStatus::Synced(outcomes) => outcomes,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingReport {
    pub class: BindingClass,
    pub local_folder: PathBuf,
    pub grafana_folder: String,
    pub status: BindingStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishReport {
    /// No account credential in the environment; nothing was done.
    Skipped,
    Completed {
        mode: PublishMode,
        bindings: Vec<BindingReport>,
    },
}

impl PublishReport {
    pub fn bindings(&self) -> &[BindingReport] {
        match self {
            PublishReport::Skipped => &[],
            PublishReport::Completed { bindings, .. } => bindings,
        }
    }

    /// Dashboards uploaded across every binding and stack.
    pub fn uploaded(&self) -> usize {
        self.outcomes().map(|o| o.report.uploaded).sum()
    }

    pub fn deleted(&self) -> usize {
        self.outcomes().map(|o| o.report.deleted).sum()
    }

    fn outcomes(&self) -> impl Iterator<Item = &StackOutcome> {
        self.bindings().iter().flat_map(|b| b.status.outcomes())
    }
}

/// A configured publish run.
pub struct Publisher {
    config: PublisherConfig,
    store: Box<dyn DashboardStore>,
    cloud: Option<Box<dyn CloudApi>>,
    credential: Option<String>,
}

impl Publisher {
    /// Publisher over the real filesystem, with the account credential read
    /// from `GRAFANA_CLOUD_TOKEN`. A set but empty variable still counts.
    pub fn new(config: PublisherConfig) -> Self {
        let credential = cloud_token();
        Self {
            config,
            store: Box::new(FsStore),
            cloud: None,
            credential,
        }
    }

    pub fn load(path: Option<&Path>) -> Result<Self, SyncError> {
        Ok(Self::new(config::load(path)?))
    }

    pub fn with_store(mut self, store: impl DashboardStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Use `cloud` instead of an HTTP client built from the credential.
    pub fn with_cloud_client(mut self, cloud: impl CloudApi + 'static) -> Self {
        self.cloud = Some(Box::new(cloud));
        self
    }

    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential;
        self
    }

    /// Publish every binding. Custom bindings go first, then shared ones,
    /// each in configuration order. The first binding that fails after
    /// retry stops the run.
    pub fn publish(&self, mode: PublishMode) -> Result<PublishReport, SyncError> {
        let Some(token) = self.credential.as_deref() else {
            tracing::error!("{CLOUD_TOKEN_ENV} not set, skipping...");
            return Ok(PublishReport::Skipped);
        };

        let http;
        let cloud: &dyn CloudApi = match &self.cloud {
            Some(cloud) => cloud.as_ref(),
            None => {
                http = CloudClient::new(token);
                &http
            }
        };

        let stacks = cloud.list_stacks().map_err(SyncError::ListStacks)?;
        tracing::info!(count = stacks.len(), "enumerated stacks");
        let targets = select(
            stacks,
            &self.config.exclusion_set(),
            mode,
            &self.config.test_stack,
            &self.config.custom_stack,
        );

        let options = ReconcileOptions::from(&self.config);
        let reconciler = Reconciler::new(cloud, self.store.as_ref(), &options);

        let bindings = self
            .config
            .custom_dashboards
            .iter()
            .map(|b| (Binding::new(BindingClass::Custom, b), &targets.custom))
            .chain(
                self.config
                    .common_dashboards
                    .iter()
                    .map(|b| (Binding::new(BindingClass::Shared, b), &targets.shared)),
            );

        let mut reports = Vec::new();
        for (binding, targets) in bindings {
            let status = publish_binding(&reconciler, &binding, targets).map_err(|source| {
                SyncError::Binding {
                    local_folder: binding.local_folder().to_path_buf(),
                    grafana_folder: binding.grafana_folder().to_string(),
                    source: Box::new(source),
                }
            })?;
            reports.push(BindingReport {
                class: binding.class,
                local_folder: binding.folders.local_folder,
                grafana_folder: binding.folders.grafana_folder,
                status,
            });
        }

        Ok(PublishReport::Completed {
            mode,
            bindings: reports,
        })
    }
}

fn publish_binding(
    reconciler: &Reconciler<'_>,
    binding: &Binding,
    targets: &Targets,
) -> Result<BindingStatus, SyncError> {
    if !binding.is_configured() {
        tracing::info!(class = %binding.class, "dashboards not configured, skipping");
        return Ok(BindingStatus::NotConfigured);
    }
    if !reconciler.local_folder_present(binding)? {
        tracing::info!(
            local_folder = %binding.local_folder().display(),
            "local folder does not exist, skipping"
        );
        return Ok(BindingStatus::LocalFolderMissing);
    }

    tracing::info!(
        class = %binding.class,
        local_folder = %binding.local_folder().display(),
        grafana_folder = %binding.grafana_folder(),
        "syncing dashboards"
    );
    let stacks = targets.stacks()?;
    let outcomes = run_with_retry(stacks, |stack| reconciler.reconcile_stack(stack, binding))?;
    Ok(BindingStatus::Synced(outcomes))
}
