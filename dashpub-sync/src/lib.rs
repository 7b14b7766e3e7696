//! # dashpub-sync
//!
//! Reconciliation engine: publishes local dashboard folders to remote stacks.
//!
//! Call [`Publisher::publish`] for a full run. The building blocks are
//! exposed for reuse:
//! - [`selector`]: which stacks a run targets
//! - [`transform`]: per-stack rewrite of a dashboard document
//! - [`folders`]: nested destination folder resolution
//! - [`reconciler`]: one stack × one binding
//! - [`retry`]: once-per-stack retry with failure isolation

pub mod document;
pub mod error;
pub mod folders;
pub mod identifier;
pub mod pipeline;
pub mod reconciler;
pub mod retry;
pub mod selector;
pub mod session;
pub mod storage;
pub mod transform;

pub use error::SyncError;
pub use pipeline::{BindingReport, BindingStatus, PublishReport, Publisher};
pub use reconciler::{Binding, BindingClass, ReconcileOptions, Reconciler, StackReport};
pub use retry::StackOutcome;
pub use selector::{PublishMode, TargetSets, Targets};
pub use storage::{DashboardStore, FsStore, MemStore};
