use anyhow::Context;
use reqwest::StatusCode;
use tracing::{error, info};
use url::Url;

use super::{AuthError, AuthMethod, Identity};
use crate::api::ApiClient;

pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
pub const DEFAULT_SCOPE: &str = "user:email";

#[derive(Debug, Clone)]
pub struct GitHubOAuth {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
}

impl GitHubOAuth {
    /// Provider page the user is sent to; it redirects back to `redirect_uri` with `?code=`.
    pub fn authorize_url(&self) -> anyhow::Result<Url> {
        Url::parse_with_params(
            GITHUB_AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", self.scope.as_str()),
            ],
        )
        .context("Failed to build GitHub authorize URL")
    }
}

/// Accepts either the bare code or the whole callback URL the provider redirected to.
pub fn extract_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    match Url::parse(input) {
        Ok(url) => url
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned())
            .filter(|c| !c.is_empty()),
        Err(_) => Some(input.to_string()),
    }
}

/// Hand the authorization code to the backend, which trades it for a session.
pub async fn complete(api: &ApiClient, input: &str) -> Result<Identity, AuthError> {
    let code = extract_code(input).ok_or(AuthError::MissingCode)?;

    let (status, body) = api
        .exchange_github_code(&code)
        .await
        .inspect_err(|e| error!(error = %e, "github oauth exchange failed"))?;

    if status != StatusCode::OK {
        error!(%status, "github oauth: unexpected status");
        return Err(AuthError::UnexpectedStatus(status));
    }

    let username = body
        .as_ref()
        .and_then(|b| b["login"].as_str().or_else(|| b["username"].as_str()))
        .unwrap_or("github user")
        .to_string();

    info!(%username, "github oauth success");
    Ok(Identity::new(username, AuthMethod::GitHub))
}
