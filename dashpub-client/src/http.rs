//! Thin JSON-over-HTTP helper shared by the cloud and stack clients.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub(crate) struct Http {
    agent: ureq::Agent,
    base: String,
    token: String,
}

impl Http {
    /// `base` is the API root without a trailing slash, e.g. `https://grafana.com/api`.
    pub(crate) fn new(base: impl Into<String>, token: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            base: base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn request(&self, method: &'static str, url: &str, headers: &[(&str, &str)]) -> ureq::Request {
        let mut req = self
            .agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/json");
        for (name, value) in headers {
            req = req.set(name, value);
        }
        req
    }

    pub(crate) fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        let mut req = self.request("GET", &url, &[]);
        for (k, v) in query {
            req = req.query(k, v);
        }
        let resp = check("GET", &url, req.call())?;
        decode(&url, resp)
    }

    /// Like [`Http::get_json`], but maps HTTP 404 to `Ok(None)`.
    pub(crate) fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ClientError> {
        match self.get_json(path, &[]) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.status() == Some(404) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        let resp = check("POST", &url, self.request("POST", &url, headers).send_json(body))?;
        decode(&url, resp)
    }

    pub(crate) fn delete(&self, path: &str, headers: &[(&str, &str)]) -> Result<(), ClientError> {
        let url = self.url(path);
        check("DELETE", &url, self.request("DELETE", &url, headers).call())?;
        Ok(())
    }
}

fn check(
    method: &'static str,
    url: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response, ClientError> {
    match result {
        Ok(resp) => Ok(resp),
        Err(ureq::Error::Status(status, resp)) => Err(ClientError::Status {
            method,
            url: url.to_string(),
            status,
            body: resp.into_string().unwrap_or_default(),
        }),
        Err(ureq::Error::Transport(t)) => Err(ClientError::Transport {
            method,
            url: url.to_string(),
            message: t.to_string(),
        }),
    }
}

fn decode<T: DeserializeOwned>(url: &str, resp: ureq::Response) -> Result<T, ClientError> {
    resp.into_json::<T>().map_err(|e| ClientError::Decode {
        url: url.to_string(),
        source: e,
    })
}

/// Percent-encode a single path segment.
pub(crate) fn segment(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}
