use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use anyhow::Result;

use crate::account::oauth::GitHubOAuth;
use crate::account::{AuthForm, Identity};
use crate::api::ApiClient;
use crate::projects::filter::FilterState;
use crate::projects::{ProjectCatalog, ProjectSource};

/// Everything one Discord user has going: form mode, search state, login.
pub struct Session {
    pub form: AuthForm,
    pub filter: FilterState,
    pub identity: Option<Identity>,
    /// Carries this user's backend cookies.
    pub api: Arc<ApiClient>,
}

impl Session {
    pub fn new(api: ApiClient) -> Self {
        Self {
            form: AuthForm::new(),
            filter: FilterState::new(),
            identity: None,
            api: Arc::new(api),
        }
    }
}

pub struct AppState {
    pub catalog: Arc<RwLock<ProjectCatalog>>,
    pub source: ProjectSource,
    /// Shared client, used for project listing and as the template for session clients.
    pub api: Arc<ApiClient>,
    pub github: Option<GitHubOAuth>,
    pub admin_ids: HashSet<u64>,
    pub sessions: Arc<RwLock<HashMap<u64, Session>>>,
}

impl AppState {
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// Run `f` against the user's session, creating it on first use.
    pub async fn with_session<T>(&self, user_id: u64, f: impl FnOnce(&mut Session) -> T) -> Result<T> {
        let mut sessions = self.sessions.write().await;
        let session = match sessions.entry(user_id) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => entry.insert(Session::new(self.api.fork()?)),
        };
        Ok(f(session))
    }
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state() -> AppState {
        let api = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        AppState {
            catalog: Arc::new(RwLock::new(ProjectCatalog::new(Vec::new()))),
            source: ProjectSource::Api,
            api: Arc::new(api),
            github: None,
            admin_ids: HashSet::from([7]),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[tokio::test]
    async fn test_sessions_are_per_user() {
        let state = state();
        state
            .with_session(1, |s| s.filter.select_topic("rust"))
            .await
            .unwrap();

        let first = state.with_session(1, |s| s.filter.topics().to_vec()).await.unwrap();
        let second = state.with_session(2, |s| s.filter.topics().to_vec()).await.unwrap();
        assert_eq!(first, vec!["rust"]);
        assert!(second.is_empty());
    }

    #[test]
    fn test_is_admin() {
        let state = state();
        assert!(state.is_admin(7));
        assert!(!state.is_admin(8));
    }
}
