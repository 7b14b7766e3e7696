//! Publisher configuration (`publisher-config.yaml`).
//!
//! # Example
//!
//! ```yaml
//! exclusions: [legacy-stack]
//! commonDashboards:
//!   - localFolder: dashboards/common
//!     grafanaFolder: Common
//! customDashboards:
//!   localFolder: dashboards/custom
//!   grafanaFolder: Custom
//! customStack: acme-custom
//! testStack: acme-test
//! tags: [managed]
//! rootFolder: Platform/Generated
//! idSuffix: -pr-12
//! ```
//!
//! Binding lists accept either a single mapping or a sequence of mappings;
//! they are always serialized back as a sequence.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;
use crate::types::StackSlug;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "publisher-config.yaml";

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// One `{localFolder, grafanaFolder}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardBinding {
    #[serde(default)]
    pub local_folder: PathBuf,
    #[serde(default)]
    pub grafana_folder: String,
}

impl DashboardBinding {
    pub fn new(local_folder: impl Into<PathBuf>, grafana_folder: impl Into<String>) -> Self {
        Self {
            local_folder: local_folder.into(),
            grafana_folder: grafana_folder.into(),
        }
    }

    /// A binding is only acted upon when both sides are non-blank.
    pub fn is_configured(&self) -> bool {
        !self.local_folder.as_os_str().is_empty() && !self.grafana_folder.trim().is_empty()
    }
}

/// Root of `publisher-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherConfig {
    /// Stack slugs never published to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,

    /// Shared dashboards, published to every non-excluded stack.
    #[serde(default, alias = "sharedDashboards", deserialize_with = "one_or_many")]
    pub common_dashboards: Vec<DashboardBinding>,

    /// Dashboards published only to `custom_stack`.
    #[serde(default, deserialize_with = "one_or_many")]
    pub custom_dashboards: Vec<DashboardBinding>,

    #[serde(default)]
    pub custom_stack: String,

    #[serde(default)]
    pub test_stack: String,

    /// Tags appended to every uploaded dashboard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Slash-delimited folder path every destination folder is nested under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<String>,

    /// Run-scoped suffix appended to every dashboard uid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_suffix: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<DashboardBinding>),
    One(DashboardBinding),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<DashboardBinding>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(refs)) => refs,
        Some(OneOrMany::One(one)) => vec![one],
    })
}

impl PublisherConfig {
    /// Materialise the exclusion list for constant-time lookups.
    pub fn exclusion_set(&self) -> ExclusionSet {
        self.exclusions.iter().map(String::as_str).collect()
    }

    /// Segments of `root_folder`, trimmed, with empty segments dropped.
    pub fn root_folder_segments(&self) -> Vec<String> {
        self.root_folder
            .as_deref()
            .map(|root| {
                root.split('/')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Configured suffix, ignoring an empty string.
    pub fn id_suffix(&self) -> Option<&str> {
        self.id_suffix.as_deref().filter(|s| !s.is_empty())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Set of stack slugs excluded from publishing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(HashSet<String>);

impl ExclusionSet {
    pub fn contains(&self, slug: &StackSlug) -> bool {
        self.0.contains(slug.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_owned).collect())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// `path` if given, otherwise [`DEFAULT_CONFIG_PATH`].
pub fn resolve_path(path: Option<&Path>) -> PathBuf {
    match path {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from(DEFAULT_CONFIG_PATH),
    }
}

/// Whether a config file exists at the resolved path.
pub fn is_configured(path: Option<&Path>) -> bool {
    resolve_path(path).exists()
}

/// Load the config from an explicit path.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<PublisherConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// `load_at` on the resolved path.
pub fn load(path: Option<&Path>) -> Result<PublisherConfig, ConfigError> {
    load_at(&resolve_path(path))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_binding_is_wrapped_in_a_list() {
        let cfg: PublisherConfig = serde_yaml::from_str(
            "commonDashboards:\n  localFolder: /local_folder_1\n  grafanaFolder: Common\n",
        )
        .unwrap();
        assert_eq!(
            cfg.common_dashboards,
            vec![DashboardBinding::new("/local_folder_1", "Common")]
        );
        assert!(cfg.custom_dashboards.is_empty());
    }

    #[test]
    fn binding_list_keeps_order() {
        let cfg: PublisherConfig = serde_yaml::from_str(
            "commonDashboards:\n- localFolder: /a\n  grafanaFolder: A\n- localFolder: /b\n  grafanaFolder: B\n",
        )
        .unwrap();
        assert_eq!(
            cfg.common_dashboards,
            vec![
                DashboardBinding::new("/a", "A"),
                DashboardBinding::new("/b", "B"),
            ]
        );
    }

    #[test]
    fn scalar_binding_is_rejected() {
        let err = serde_yaml::from_str::<PublisherConfig>("commonDashboards: just-a-string\n");
        assert!(err.is_err());
    }

    #[test]
    fn bindings_serialize_as_list() {
        let cfg = PublisherConfig {
            common_dashboards: vec![DashboardBinding::new("/a", "A")],
            ..Default::default()
        };
        let yaml = cfg.to_yaml().unwrap();
        assert!(yaml.contains("commonDashboards:\n- localFolder: /a"), "{yaml}");
    }

    #[test]
    fn blank_binding_is_not_configured() {
        assert!(!DashboardBinding::new("", "Common").is_configured());
        assert!(!DashboardBinding::new("/a", "  ").is_configured());
        assert!(DashboardBinding::new("/a", "Common").is_configured());
    }

    #[test]
    fn root_folder_segments_skip_empty_parts() {
        let cfg = PublisherConfig {
            root_folder: Some("/Platform// Generated /".into()),
            ..Default::default()
        };
        assert_eq!(cfg.root_folder_segments(), vec!["Platform", "Generated"]);
        assert!(PublisherConfig::default().root_folder_segments().is_empty());
    }

    #[test]
    fn exclusion_set_matches_slugs() {
        let cfg = PublisherConfig {
            exclusions: vec!["legacy".into(), "sandbox".into()],
            ..Default::default()
        };
        let set = cfg.exclusion_set();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&StackSlug::from("legacy")));
        assert!(!set.contains(&StackSlug::from("prod")));
    }

    #[test]
    fn empty_suffix_is_ignored() {
        let cfg = PublisherConfig {
            id_suffix: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(cfg.id_suffix(), None);
    }
}
