//! Dashpub core library: domain types, publisher configuration, errors.
//!
//! Public API surface:
//! - [`types`]: stacks, folders, datasources and upload records
//! - [`config`]: `publisher-config.yaml` model and loader
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{DashboardBinding, ExclusionSet, PublisherConfig};
pub use error::ConfigError;
pub use types::{Datasource, DashboardUpload, Folder, Stack, StackSlug, Stacks};
