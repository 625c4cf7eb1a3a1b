use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::account::oauth::{GitHubOAuth, DEFAULT_SCOPE};
use crate::projects::ProjectSource;

pub struct AppConfig {
    pub discord_token: String,
    pub guild_id: Option<u64>,
    pub admin_ids: HashSet<u64>,
    pub api_base_url: String,
    pub http_timeout: Duration,
    pub projects: ProjectSource,
    /// `None` when no GitHub client id is configured.
    pub github: Option<GitHubOAuth>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let discord_token = var("DISCORD_TOKEN").context("DISCORD_TOKEN required")?;

        let guild_id = var("DISCORD_GUILD_ID").and_then(|s| s.trim().parse::<u64>().ok());

        let admin_ids: HashSet<u64> = var("ADMIN_USER_IDS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse::<u64>().ok())
            .collect();

        let api_base_url =
            var("API_BASE_URL").unwrap_or_else(|| "http://localhost:5000".to_string());

        let http_timeout = match var("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).unwrap_or_else(|e| {
                warn!("Invalid HTTP_TIMEOUT_SECS value {raw:?}: {e}, using 30");
                Duration::from_secs(30)
            }),
            None => Duration::from_secs(30),
        };

        let projects = match var("PROJECTS_FILE").filter(|p| !p.trim().is_empty()) {
            Some(path) => ProjectSource::File(PathBuf::from(path)),
            None => ProjectSource::Api,
        };

        let public_origin =
            var("PUBLIC_ORIGIN").unwrap_or_else(|| "http://127.0.0.1:3000".to_string());
        let github = var("GITHUB_CLIENT_ID")
            .filter(|id| !id.trim().is_empty())
            .map(|client_id| GitHubOAuth {
                client_id,
                redirect_uri: format!("{}/github_callback", public_origin.trim_end_matches('/')),
                scope: var("GITHUB_OAUTH_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            });
        if github.is_none() {
            info!("GITHUB_CLIENT_ID not set, GitHub login disabled");
        }

        Ok(Self {
            discord_token,
            guild_id,
            admin_ids,
            api_base_url,
            http_timeout,
            projects,
            github,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("DISCORD_TOKEN", "t")])).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(matches!(config.projects, ProjectSource::Api));
        assert!(config.github.is_none());
        assert!(config.admin_ids.is_empty());
        assert!(config.guild_id.is_none());
    }

    #[test]
    fn test_token_required() {
        assert!(AppConfig::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn test_full_config() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "t"),
            ("DISCORD_GUILD_ID", "42"),
            ("ADMIN_USER_IDS", "1, 2,x"),
            ("PROJECTS_FILE", "projects.json"),
            ("GITHUB_CLIENT_ID", "client"),
            ("PUBLIC_ORIGIN", "https://finder.example/"),
            ("HTTP_TIMEOUT_SECS", "nope"),
        ]))
        .unwrap();

        assert_eq!(config.guild_id, Some(42));
        assert_eq!(config.admin_ids, HashSet::from([1, 2]));
        assert!(matches!(config.projects, ProjectSource::File(ref p) if p == &PathBuf::from("projects.json")));
        assert_eq!(config.http_timeout, Duration::from_secs(30));

        let github = config.github.unwrap();
        assert_eq!(github.client_id, "client");
        assert_eq!(github.redirect_uri, "https://finder.example/github_callback");
        assert_eq!(github.scope, "user:email");
    }
}
