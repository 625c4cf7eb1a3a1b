pub mod oauth;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, LoginRequest, RegisterRequest};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("username or password wrong")]
    InvalidCredentials,

    #[error("username already taken")]
    AlreadyExists,

    #[error("an email address is required to register")]
    MissingEmail,

    #[error("no authorization code was supplied")]
    MissingCode,

    #[error("GitHub login is not configured")]
    OAuthDisabled,

    #[error("unexpected response status {0}")]
    UnexpectedStatus(StatusCode),

    #[error("request failed: {0:#}")]
    Transport(#[from] anyhow::Error),
}

impl AuthError {
    /// Whether the user gets the specific message rather than a generic notice.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::AlreadyExists
                | AuthError::MissingEmail
                | AuthError::MissingCode
                | AuthError::OAuthDisabled
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Password,
    GitHub,
}

/// The logged-in user, held in the caller's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub method: AuthMethod,
    pub since: DateTime<Utc>,
}

impl Identity {
    pub fn new(username: impl Into<String>, method: AuthMethod) -> Self {
        Self {
            username: username.into(),
            method,
            since: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

/// Login/registration form: which mode it is in and what it displays.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    mode: AuthMode,
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn switch(&mut self) -> AuthMode {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.mode
    }

    pub fn button_text(&self) -> &'static str {
        match self.mode {
            AuthMode::Login => "Login",
            AuthMode::Register => "Register",
        }
    }

    pub fn switch_text(&self) -> &'static str {
        match self.mode {
            AuthMode::Login => "Don't have an account? Register here.",
            AuthMode::Register => "Already have an account? Login here.",
        }
    }

    /// Register or log in depending on the current mode.
    pub async fn submit(&self, api: &ApiClient, creds: &Credentials) -> Result<Identity, AuthError> {
        match self.mode {
            AuthMode::Login => login(api, creds).await,
            AuthMode::Register => register(api, creds).await,
        }
    }
}

pub async fn login(api: &ApiClient, creds: &Credentials) -> Result<Identity, AuthError> {
    let status = api
        .login(&LoginRequest {
            username: &creds.username,
            password: &creds.password,
        })
        .await
        .inspect_err(|e| warn!(error = %e, "login request failed"))?;

    match status {
        StatusCode::OK => {
            info!(username = %creds.username, "login succeeded");
            Ok(Identity::new(&creds.username, AuthMethod::Password))
        }
        StatusCode::UNAUTHORIZED => Err(AuthError::InvalidCredentials),
        other => {
            warn!(status = %other, "login: unexpected status");
            Err(AuthError::UnexpectedStatus(other))
        }
    }
}

/// Create the account, then log in with the same credentials.
pub async fn register(api: &ApiClient, creds: &Credentials) -> Result<Identity, AuthError> {
    let email = creds
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or(AuthError::MissingEmail)?;

    let status = api
        .register(&RegisterRequest {
            username: &creds.username,
            password: &creds.password,
            email,
        })
        .await
        .inspect_err(|e| warn!(error = %e, "register request failed"))?;

    match status {
        StatusCode::CREATED => {
            info!(username = %creds.username, "account registered");
            login(api, creds).await
        }
        StatusCode::CONFLICT => Err(AuthError::AlreadyExists),
        other => {
            warn!(status = %other, "register: unexpected status");
            Err(AuthError::UnexpectedStatus(other))
        }
    }
}
