use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::projects::types::{parse_project_list, Project};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
}

/// HTTP client for the finder backend.
///
/// Each client owns its own cookie store, so a session cookie set by
/// `/login` or `/github_oauth` stays with the user that obtained it.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// A client for the same backend with an empty cookie store.
    pub fn fork(&self) -> Result<Self> {
        Self::new(&self.base_url, self.timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `POST /login`. Only the status is meaningful to callers.
    pub async fn login(&self, req: &LoginRequest<'_>) -> Result<StatusCode> {
        let resp = self
            .client
            .post(self.endpoint("/login"))
            .json(req)
            .send()
            .await
            .context("Login request failed")?;
        debug!(status = %resp.status(), username = req.username, "login response");
        Ok(resp.status())
    }

    /// `POST /register`.
    pub async fn register(&self, req: &RegisterRequest<'_>) -> Result<StatusCode> {
        let resp = self
            .client
            .post(self.endpoint("/register"))
            .json(req)
            .send()
            .await
            .context("Register request failed")?;
        debug!(status = %resp.status(), username = req.username, "register response");
        Ok(resp.status())
    }

    /// `GET /github_oauth?code=..`. Returns the status and the JSON body, if any.
    pub async fn exchange_github_code(
        &self,
        code: &str,
    ) -> Result<(StatusCode, Option<serde_json::Value>)> {
        let resp = self
            .client
            .get(self.endpoint("/github_oauth"))
            .query(&[("code", code)])
            .send()
            .await
            .context("GitHub OAuth exchange failed")?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("Failed to read GitHub OAuth response")?;
        debug!(%status, body_len = text.len(), "github oauth response");
        Ok((status, serde_json::from_str(&text).ok()))
    }

    /// `GET /all-projects`.
    pub async fn fetch_projects(&self) -> Result<Vec<Project>> {
        let resp = self
            .client
            .get(self.endpoint("/all-projects"))
            .send()
            .await
            .context("Project list request failed")?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Project list request returned {}", status);
        }
        let bytes = resp
            .bytes()
            .await
            .context("Failed to read project list response")?;
        parse_project_list(&bytes)
    }
}
