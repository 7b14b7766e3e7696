//! In-process fake of the remote API, recording every call.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use dashpub_client::{ClientError, CloudApi, StackSession};
use dashpub_core::{Datasource, DashboardUpload, Folder, Stack, Stacks};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    OpenSession(String),
    EnsureFolder {
        stack: String,
        parent: Option<String>,
        name: String,
    },
    GetDatasource {
        stack: String,
        name: String,
    },
    Upload {
        stack: String,
        upload: DashboardUpload,
    },
    GetDashboard {
        stack: String,
        uid: String,
    },
    Delete {
        stack: String,
        uid: String,
    },
    Cleanup(String),
}

#[derive(Default)]
pub struct State {
    pub stacks: Stacks,
    pub calls: Vec<Call>,
    /// Remote dashboards by `(stack, uid)`.
    pub dashboards: HashMap<(String, String), Value>,
    /// Datasource owner ids by `(stack, datasource name)`.
    pub datasource_owners: HashMap<(String, String), String>,
    /// Remaining upload failures per stack.
    pub upload_failures: HashMap<String, u32>,
    /// Remaining session failures per stack.
    pub session_failures: HashMap<String, u32>,
    pub fail_list: bool,
}

/// Cloneable handle; clones share state, so a test keeps one while the
/// publisher owns another.
#[derive(Clone, Default)]
pub struct FakeCloud {
    state: Arc<Mutex<State>>,
}

pub fn status_error(method: &'static str, path: &str, status: u16) -> ClientError {
    ClientError::Status {
        method,
        url: format!("https://fake.grafana.net/api{path}"),
        status,
        body: "injected".into(),
    }
}

impl FakeCloud {
    pub fn with_stacks(slugs: &[&str]) -> Self {
        let cloud = Self::default();
        cloud.state().stacks = slugs
            .iter()
            .enumerate()
            .map(|(i, s)| Stack::new(i as u64 + 1, *s, format!("https://{s}.grafana.net")))
            .collect();
        cloud
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn fail_uploads(&self, stack: &str, times: u32) -> &Self {
        self.state().upload_failures.insert(stack.into(), times);
        self
    }

    pub fn fail_sessions(&self, stack: &str, times: u32) -> &Self {
        self.state().session_failures.insert(stack.into(), times);
        self
    }

    pub fn add_dashboard(&self, stack: &str, uid: &str, dashboard: Value) -> &Self {
        self.state()
            .dashboards
            .insert((stack.into(), uid.into()), dashboard);
        self
    }

    pub fn add_datasource_owner(&self, stack: &str, name: &str, user: &str) -> &Self {
        self.state()
            .datasource_owners
            .insert((stack.into(), name.into()), user.into());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn uploads(&self, stack: &str) -> Vec<DashboardUpload> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upload { stack: s, upload } if s == stack => Some(upload),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete { stack, uid } => Some((stack, uid)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

impl CloudApi for FakeCloud {
    fn list_stacks(&self) -> Result<Stacks, ClientError> {
        let state = self.state();
        if state.fail_list {
            return Err(status_error("GET", "/instances", 500));
        }
        Ok(state.stacks.clone())
    }

    fn open_session(&self, stack: &Stack) -> Result<Box<dyn StackSession>, ClientError> {
        let slug = stack.slug.to_string();
        let mut state = self.state();
        state.calls.push(Call::OpenSession(slug.clone()));
        if let Some(left) = state.session_failures.get_mut(&slug) {
            if *left > 0 {
                *left -= 1;
                return Err(status_error("POST", "/serviceaccounts", 503));
            }
        }
        Ok(Box::new(FakeSession {
            slug,
            state: Arc::clone(&self.state),
        }))
    }
}

pub struct FakeSession {
    slug: String,
    state: Arc<Mutex<State>>,
}

impl FakeSession {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

impl StackSession for FakeSession {
    fn ensure_folder(&self, parent: Option<&Folder>, name: &str) -> Result<Folder, ClientError> {
        self.state().calls.push(Call::EnsureFolder {
            stack: self.slug.clone(),
            parent: parent.map(|p| p.uid.clone()),
            name: name.into(),
        });
        let uid = match parent {
            Some(p) => format!("{}/{name}", p.uid),
            None => name.to_string(),
        };
        Ok(Folder::new(uid, name))
    }

    fn get_datasource(&self, name: &str) -> Result<Datasource, ClientError> {
        let mut state = self.state();
        state.calls.push(Call::GetDatasource {
            stack: self.slug.clone(),
            name: name.into(),
        });
        match state.datasource_owners.get(&(self.slug.clone(), name.to_string())) {
            Some(user) => Ok(Datasource {
                name: name.into(),
                kind: "loki".into(),
                user: user.clone(),
                ..Default::default()
            }),
            None => Err(status_error("GET", &format!("/datasources/name/{name}"), 404)),
        }
    }

    fn upload_dashboard(&self, dashboard: &DashboardUpload) -> Result<(), ClientError> {
        let mut state = self.state();
        state.calls.push(Call::Upload {
            stack: self.slug.clone(),
            upload: dashboard.clone(),
        });
        if let Some(left) = state.upload_failures.get_mut(&self.slug) {
            if *left > 0 {
                *left -= 1;
                return Err(status_error("POST", "/dashboards/db", 502));
            }
        }
        state.dashboards.insert(
            (self.slug.clone(), dashboard.uid.clone()),
            Value::Object(dashboard.dashboard.clone()),
        );
        Ok(())
    }

    fn get_dashboard(&self, uid: &str) -> Result<Option<Value>, ClientError> {
        let mut state = self.state();
        state.calls.push(Call::GetDashboard {
            stack: self.slug.clone(),
            uid: uid.into(),
        });
        Ok(state.dashboards.get(&(self.slug.clone(), uid.to_string())).cloned())
    }

    fn delete_dashboard(&self, uid: &str) -> Result<(), ClientError> {
        let mut state = self.state();
        state.calls.push(Call::Delete {
            stack: self.slug.clone(),
            uid: uid.into(),
        });
        state.dashboards.remove(&(self.slug.clone(), uid.to_string()));
        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), ClientError> {
        let slug = self.slug.clone();
        self.state().calls.push(Call::Cleanup(slug));
        Ok(())
    }
}
