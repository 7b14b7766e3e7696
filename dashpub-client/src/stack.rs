//! Per-stack client: folders, datasources and dashboards.

use std::thread;
use std::time::{Duration, Instant};

use dashpub_core::{Datasource, DashboardUpload, Folder, Stack};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::StackSession;
use crate::cloud::{CloudClient, ServiceAccount};
use crate::error::ClientError;
use crate::http::{segment, Http};

const UPLOAD_MESSAGE: &str = "dashpub automated dashboard upload";

/// Newly created folders are not always listed immediately; poll until they
/// are, backing off up to `FOLDER_POLL_MAX_DELAY` between attempts.
const FOLDER_POLL_INITIAL_DELAY: Duration = Duration::from_millis(500);
const FOLDER_POLL_MAX_DELAY: Duration = Duration::from_secs(10);
const FOLDER_POLL_DEADLINE: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct FolderHit {
    uid: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    uid: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateFolder<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_uid: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveDashboard<'a> {
    dashboard: &'a Map<String, Value>,
    folder_uid: &'a str,
    overwrite: bool,
    message: &'a str,
}

#[derive(Deserialize)]
struct DashboardEnvelope {
    dashboard: Value,
}

/// Production [`StackSession`] implementation.
pub struct StackClient {
    http: Http,
    cloud: CloudClient,
    stack: Stack,
    service_account: Option<ServiceAccount>,
}

impl StackClient {
    /// `base` comes from [`api_base`], validated before the service account
    /// was created.
    pub(crate) fn new(
        stack: &Stack,
        base: String,
        token: &str,
        cloud: CloudClient,
        service_account: ServiceAccount,
    ) -> Self {
        Self {
            http: Http::new(base, token),
            cloud,
            stack: stack.clone(),
            service_account: Some(service_account),
        }
    }

    /// The folder titled `name` directly under `parent`, if any.
    pub fn get_folder(
        &self,
        parent: Option<&Folder>,
        name: &str,
    ) -> Result<Option<Folder>, ClientError> {
        let query: Vec<(&str, &str)> = match parent {
            Some(p) => vec![("parentUid", p.uid.as_str())],
            None => Vec::new(),
        };
        let hits: Vec<FolderHit> = self.http.get_json("/folders", &query)?;
        tracing::debug!(stack = %self.stack.slug, folders = hits.len(), "done listing folders");
        Ok(hits
            .into_iter()
            .find(|f| f.title == name)
            .map(|f| Folder::new(f.uid, f.title)))
    }

    /// Uids of the dashboards directly inside `folder_uid`. Only the first
    /// page of search results is returned.
    pub fn list_dashboard_uids(&self, folder_uid: &str) -> Result<Vec<String>, ClientError> {
        let hits: Vec<SearchHit> = self.http.get_json(
            "/search",
            &[("folderUIDs", folder_uid), ("type", "dash-db")],
        )?;
        Ok(hits.into_iter().map(|hit| hit.uid).collect())
    }

    fn wait_until_visible(&self, parent: Option<&Folder>, name: &str) -> Result<(), ClientError> {
        let started = Instant::now();
        let mut delay = FOLDER_POLL_INITIAL_DELAY;
        loop {
            match self.get_folder(parent, name) {
                Ok(Some(_)) => return Ok(()),
                Ok(None) => {}
                Err(e) => tracing::debug!(folder = name, error = %e, "failed to get folder"),
            }
            if started.elapsed() >= FOLDER_POLL_DEADLINE {
                return Err(ClientError::FolderNotVisible {
                    name: name.to_string(),
                });
            }
            thread::sleep(delay);
            delay = (delay * 2).min(FOLDER_POLL_MAX_DELAY);
        }
    }
}

impl StackSession for StackClient {
    fn ensure_folder(&self, parent: Option<&Folder>, name: &str) -> Result<Folder, ClientError> {
        if let Some(folder) = self.get_folder(parent, name)? {
            return Ok(folder);
        }

        tracing::debug!(stack = %self.stack.slug, folder = name, "creating new folder");
        let created: FolderHit = self.http.post_json(
            "/folders",
            &[],
            &CreateFolder {
                title: name,
                parent_uid: parent.map(|p| p.uid.as_str()),
            },
        )?;
        self.wait_until_visible(parent, name)?;
        Ok(Folder::new(created.uid, created.title))
    }

    fn get_datasource(&self, name: &str) -> Result<Datasource, ClientError> {
        self.http
            .get_json(&format!("/datasources/name/{}", segment(name)), &[])
    }

    fn upload_dashboard(&self, dashboard: &DashboardUpload) -> Result<(), ClientError> {
        let _: Value = self.http.post_json(
            "/dashboards/db",
            &[],
            &SaveDashboard {
                dashboard: &dashboard.dashboard,
                folder_uid: &dashboard.folder_uid,
                overwrite: true,
                message: UPLOAD_MESSAGE,
            },
        )?;
        Ok(())
    }

    fn get_dashboard(&self, uid: &str) -> Result<Option<Value>, ClientError> {
        let envelope: Option<DashboardEnvelope> = self
            .http
            .get_optional(&format!("/dashboards/uid/{}", segment(uid)))?;
        Ok(envelope.map(|e| e.dashboard))
    }

    fn delete_dashboard(&self, uid: &str) -> Result<(), ClientError> {
        self.http
            .delete(&format!("/dashboards/uid/{}", segment(uid)), &[])
    }

    fn cleanup(&mut self) -> Result<(), ClientError> {
        match self.service_account.take() {
            Some(sa) => self.cloud.delete_service_account(self.stack.id, sa.id),
            None => Ok(()),
        }
    }
}

/// `<stack url>/api`, rejecting URLs without an http(s) scheme and host.
pub fn api_base(stack: &Stack) -> Result<String, ClientError> {
    let url = stack.url.trim().trim_end_matches('/');
    let host = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or_default();
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(ClientError::InvalidStackUrl {
            stack: stack.slug.to_string(),
            url: stack.url.clone(),
        });
    }
    Ok(format!("{url}/api"))
}
