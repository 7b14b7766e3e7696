//! Account-level client: stack enumeration and temporary service accounts.
//!
//! Every stack session is backed by a short-lived service account created on
//! the stack through the account API, plus a token minted for it. The
//! session deletes the service account again on cleanup.

use chrono::Utc;
use dashpub_core::{Stack, Stacks};
use serde::{Deserialize, Serialize};

use crate::api::{CloudApi, StackSession};
use crate::error::ClientError;
use crate::http::Http;
use crate::stack::{api_base, StackClient};

/// Environment variable holding the account API credential.
pub const CLOUD_TOKEN_ENV: &str = "GRAFANA_CLOUD_TOKEN";

pub const CLOUD_API_URL: &str = "https://grafana.com/api";

const SESSION_ROLE: &str = "Editor";
const TOKEN_TTL_SECONDS: u32 = 500;

/// The account credential, if [`CLOUD_TOKEN_ENV`] is set. Presence is what
/// counts: an empty value is still returned.
pub fn cloud_token() -> Option<String> {
    std::env::var(CLOUD_TOKEN_ENV).ok()
}

/// A service account on a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub is_disabled: bool,
}

/// A service account token. `key` is only returned on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Deserialize)]
struct InstanceList {
    #[serde(default)]
    items: Vec<Stack>,
}

#[derive(Serialize)]
struct CreateServiceAccount<'a> {
    name: &'a str,
    role: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateToken<'a> {
    name: &'a str,
    seconds_to_live: u32,
}

/// Production [`CloudApi`] implementation.
#[derive(Clone)]
pub struct CloudClient {
    http: Http,
}

impl CloudClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(CLOUD_API_URL, token)
    }

    pub fn with_base_url(base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: Http::new(base, token),
        }
    }

    /// Build a client from [`CLOUD_TOKEN_ENV`].
    pub fn from_env() -> Result<Self, ClientError> {
        let token = cloud_token().ok_or(ClientError::MissingCredential(CLOUD_TOKEN_ENV))?;
        Ok(Self::new(token))
    }

    /// The stack with `slug`, looked up server-side.
    pub fn get_stack(&self, slug: &str) -> Result<Stack, ClientError> {
        let list: InstanceList = self.http.get_json("/instances", &[("slug", slug)])?;
        list.items
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::StackNotFound(slug.to_string()))
    }

    pub fn create_service_account(
        &self,
        stack_id: u64,
        name: &str,
        role: &str,
    ) -> Result<ServiceAccount, ClientError> {
        let request_id = format!("sa-name-{name}");
        self.http.post_json(
            &format!("/instances/{stack_id}/api/serviceaccounts"),
            &[("X-Request-Id", &request_id)],
            &CreateServiceAccount { name, role },
        )
    }

    pub fn create_token(
        &self,
        stack_id: u64,
        service_account_id: u64,
        name: &str,
    ) -> Result<Token, ClientError> {
        let request_id = service_account_id.to_string();
        self.http.post_json(
            &format!("/instances/{stack_id}/api/serviceaccounts/{service_account_id}/tokens"),
            &[("X-Request-Id", &request_id)],
            &CreateToken {
                name,
                seconds_to_live: TOKEN_TTL_SECONDS,
            },
        )
    }

    pub fn delete_service_account(
        &self,
        stack_id: u64,
        service_account_id: u64,
    ) -> Result<(), ClientError> {
        let request_id = format!("sa-id-{service_account_id}");
        self.http.delete(
            &format!("/instances/{stack_id}/api/serviceaccounts/{service_account_id}"),
            &[("X-Request-Id", &request_id)],
        )
    }

    /// Create a temporary service account on `stack` and a client that
    /// authenticates with a token minted for it. The stack URL is validated
    /// first so that nothing is created for a stack that cannot be reached.
    pub fn stack_client(&self, stack: &Stack) -> Result<StackClient, ClientError> {
        let base = api_base(stack)?;
        let sa_name = session_account_name();
        tracing::info!(stack = %stack.slug, sa_name = %sa_name, "creating service account");
        let account = self.create_service_account(stack.id, &sa_name, SESSION_ROLE)?;

        let token_name = format!("temp-token-{sa_name}");
        tracing::info!(stack = %stack.slug, token_name = %token_name, "creating service account token");
        let token = match self.create_token(stack.id, account.id, &token_name) {
            Ok(token) => token,
            Err(e) => {
                if let Err(cleanup) = self.delete_service_account(stack.id, account.id) {
                    tracing::warn!(stack = %stack.slug, error = %cleanup, "failed to remove orphaned service account");
                }
                return Err(e);
            }
        };

        Ok(StackClient::new(stack, base, &token.key, self.clone(), account))
    }
}

impl CloudApi for CloudClient {
    fn list_stacks(&self) -> Result<Stacks, ClientError> {
        let list: InstanceList = self.http.get_json("/instances", &[])?;
        Ok(list.items)
    }

    fn open_session(&self, stack: &Stack) -> Result<Box<dyn StackSession>, ClientError> {
        Ok(Box::new(self.stack_client(stack)?))
    }
}

/// `dashpub-editor-<YYYYmmdd_HHMM>`
fn session_account_name() -> String {
    format!("dashpub-editor-{}", Utc::now().format("%Y%m%d_%H%M"))
}
