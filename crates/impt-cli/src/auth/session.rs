//! Valid access tokens on demand
//!
//! [`SessionManager::session`] is the single gate every API call goes through:
//! it hands out the stored token while it is valid and refreshes it with the
//! login key or refresh token once it is not.

use super::config::AuthConfig;
use super::location::AuthLocation;
use super::login::{authenticate, LoginCredentials};
use crate::context::Context;
use crate::error::{CliError, Result};
use chrono::{DateTime, Duration, Utc};
use impt_sdk::ImpCentralApi;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Authenticated access to one endpoint
#[derive(Clone)]
pub struct Session {
    pub account_id: Option<String>,
    pub endpoint: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub api: Arc<dyn ImpCentralApi>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("account_id", &self.account_id)
            .field("endpoint", &self.endpoint)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Remaining lifetime of a token that cannot be refreshed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "minutes")]
pub enum TokenStatus {
    Expired,
    ExpiresIn(i64),
}

impl TokenStatus {
    pub fn at(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = expires_at - now;
        if remaining < Duration::zero() {
            TokenStatus::Expired
        } else {
            TokenStatus::ExpiresIn(remaining.num_minutes())
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, TokenStatus::Expired)
    }
}

impl std::fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenStatus::Expired => write!(f, "Expired"),
            TokenStatus::ExpiresIn(minutes) => write!(f, "Expires in {minutes} minutes"),
        }
    }
}

pub struct SessionManager<'a> {
    ctx: &'a Context,
}

impl<'a> SessionManager<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    fn refresh_margin(&self) -> Duration {
        let secs = i64::try_from(self.ctx.settings.auth.token_refresh_margin_secs).unwrap_or(0);
        Duration::seconds(secs)
    }

    /// Session for the account `config` has selected.
    ///
    /// Refreshed tokens are written back to the auth file.
    pub async fn session(&self, config: &mut AuthConfig) -> Result<Session> {
        match config.location() {
            AuthLocation::Any => Err(config.no_config()),
            AuthLocation::EnvVars => self.env_session(config).await,
            _ => self.stored_session(config).await,
        }
    }

    async fn env_session(&self, config: &AuthConfig) -> Result<Session> {
        let env = config.env_credentials().ok_or_else(|| config.no_config())?;
        let credentials = LoginCredentials::from_options(
            env.login_key.clone(),
            env.user.clone(),
            env.password.clone(),
        )
        .ok_or_else(|| config.no_config())?;

        let endpoint = config.endpoint(self.ctx.default_endpoint());
        let api = self.ctx.connector.connect(&endpoint)?;
        debug!("Logging in with environment credentials at {}", endpoint);
        let token = authenticate(api.as_ref(), &credentials, self.ctx.prompter()).await?;

        Ok(Session {
            account_id: None,
            endpoint,
            access_token: token.access_token,
            expires_at: token.expires_at,
            api,
        })
    }

    async fn stored_session(&self, config: &mut AuthConfig) -> Result<Session> {
        let endpoint = config.endpoint(self.ctx.default_endpoint());
        let record = config.selected()?;
        let account_id = config.account_id().map(str::to_string);
        let api = self.ctx.connector.connect(&endpoint)?;

        // Only refreshable tokens are renewed ahead of expiry
        let refreshable = record.login_key.is_some() || record.refresh_token.is_some();
        let deadline = if refreshable {
            Utc::now() + self.refresh_margin()
        } else {
            Utc::now()
        };
        if !record.is_expired_at(deadline) {
            return Ok(Session {
                account_id,
                endpoint,
                access_token: record.access_token.clone(),
                expires_at: record.expires_at,
                api,
            });
        }

        let token = if let Some(login_key) = &record.login_key {
            debug!("Access token expired, requesting a new one with the login key");
            api.get_access_token(login_key).await?
        } else if let Some(refresh_token) = &record.refresh_token {
            debug!("Access token expired, refreshing");
            api.refresh_access_token(refresh_token).await?
        } else {
            return Err(CliError::TokenExpired {
                account: account_id.unwrap_or_default(),
            });
        };

        let record = config.selected_mut()?;
        record.apply_token(token);
        let session = Session {
            account_id,
            endpoint,
            access_token: record.access_token.clone(),
            expires_at: record.expires_at,
            api,
        };
        config.save(false).await?;
        info!("Refreshed access token");
        Ok(session)
    }
}
