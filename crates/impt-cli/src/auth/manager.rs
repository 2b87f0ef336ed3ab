//! Auth commands: login, logout, info, select and list

use super::config::AuthConfig;
use super::location::AuthLocation;
use super::login::{authenticate, LoginCredentials};
use super::registry::{AccountGroup, PendingSession};
use super::session::TokenStatus;
use crate::context::Context;
use crate::error::{CliError, Result};
use crate::interactive::{choose_account, ExistingConfigChoice, LoginMethod};
use chrono::Utc;
use impt_sdk::api::CURRENT_ACCOUNT;
use serde::Serialize;
use tracing::{info, warn};

/// Inputs of `impt auth login`
#[derive(Debug, Clone, Default)]
pub struct LoginOptions {
    /// Write the local auth file instead of the global one
    pub local: bool,
    pub endpoint: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub login_key: Option<String>,
    /// Do not store the login key or refresh token
    pub temp: bool,
    pub make_default: bool,
    /// Skip the question about an existing auth file
    pub confirmed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub account_id: String,
    pub user_name: String,
    pub location: AuthLocation,
    pub is_default: bool,
}

/// What `impt auth info` reports about one account
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfo {
    pub auth_type: String,
    pub endpoint: String,
    pub refreshable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<TokenStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Info gathered for one account, possibly cut short by an error
#[derive(Debug)]
pub struct InfoReport {
    pub info: AuthInfo,
    pub error: Option<CliError>,
    /// Whether the partial info is worth showing next to the error
    pub show_partial: bool,
}

impl InfoReport {
    pub fn into_result(self) -> Result<AuthInfo> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.info),
        }
    }
}

pub struct AuthManager<'a> {
    ctx: &'a Context,
}

impl<'a> AuthManager<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    fn file_location(local: bool) -> AuthLocation {
        if local {
            AuthLocation::Local
        } else {
            AuthLocation::Global
        }
    }

    /// Authenticate and store the account in the local or global auth file
    pub async fn login(&self, options: LoginOptions) -> Result<LoginOutcome> {
        let location = Self::file_location(options.local);
        let mut config = AuthConfig::load(location, &self.ctx.paths, None).await?;
        let prompter = self.ctx.prompter();

        let mut make_default = options.make_default;
        if config.exists() && !options.confirmed {
            match ExistingConfigChoice::prompt(prompter, location)? {
                ExistingConfigChoice::Cancel => return Err(CliError::Cancelled),
                ExistingConfigChoice::AddAccount => {}
                ExistingConfigChoice::AddAccountAsDefault => make_default = true,
            }
        }

        let endpoint = options
            .endpoint
            .clone()
            .unwrap_or_else(|| self.ctx.default_endpoint().to_string());
        let api = self.ctx.connector.connect(&endpoint)?;

        let credentials = LoginCredentials::or_prompt(
            LoginCredentials::from_options(options.login_key, options.user, options.password),
            prompter,
        )?;
        let token = authenticate(api.as_ref(), &credentials, prompter).await?;
        let pending = PendingSession::new(
            options.endpoint,
            token,
            credentials.login_key().map(str::to_string),
        );

        let account = api
            .get_account(pending.access_token(), CURRENT_ACCOUNT)
            .await?;

        let is_default = config
            .registry_mut()
            .commit_pending(
                &account.id,
                Some(account.username.clone()),
                pending,
                make_default,
                options.temp,
            )
            .is_default;
        config.select_account(account.id.clone());
        config.save(options.temp).await?;

        info!("Logged in as {} ({})", account.username, account.id);
        Ok(LoginOutcome {
            account_id: account.id,
            user_name: account.username,
            location,
            is_default,
        })
    }

    /// Delete the local or global auth file
    pub async fn logout(&self, local: bool) -> Result<AuthLocation> {
        let location = Self::file_location(local);
        let mut config = AuthConfig::load(location, &self.ctx.paths, None).await?;
        config.delete().await?;
        Ok(location)
    }

    /// Info about the account the resolved config acts as
    pub async fn info(&self, account: Option<&str>) -> Result<InfoReport> {
        let mut config = AuthConfig::resolve(&self.ctx.paths, &self.ctx.env, account).await?;
        Ok(self.info_for(&mut config).await)
    }

    /// Info about every account of the resolved config, one after another.
    ///
    /// `on_report` sees each account's report as soon as it is ready.
    pub async fn info_all<F>(&self, mut on_report: F) -> Result<()>
    where
        F: FnMut(Option<&str>, &InfoReport),
    {
        let mut config = AuthConfig::resolve(&self.ctx.paths, &self.ctx.env, None).await?;

        let ids = config.registry().ids();
        if ids.is_empty() {
            let report = self.info_for(&mut config).await;
            on_report(None, &report);
            return report.into_result().map(|_| ());
        }

        let mut failed = 0;
        for id in &ids {
            config.select_account(id.clone());
            let report = self.info_for(&mut config).await;
            if let Some(e) = &report.error {
                warn!("Info for account {} failed: {}", id, e);
                failed += 1;
            }
            on_report(Some(id.as_str()), &report);
        }

        if failed > 0 {
            return Err(CliError::PartialFailure {
                succeeded: ids.len() - failed,
                failed,
            });
        }
        Ok(())
    }

    async fn info_for(&self, config: &mut AuthConfig) -> InfoReport {
        let refreshable = config.can_refresh_token();
        let mut info = AuthInfo {
            auth_type: config.auth_type(),
            endpoint: config.endpoint(self.ctx.default_endpoint()),
            refreshable,
            ..Default::default()
        };
        if refreshable {
            let method = if config.login_key().is_some() {
                LoginMethod::LoginKey
            } else {
                LoginMethod::UserPassword
            };
            info.login_method = Some(method.label().to_string());
        }

        let error = self.collect_info(config, &mut info).await.err();
        InfoReport {
            info,
            error,
            show_partial: config.location() != AuthLocation::Any,
        }
    }

    async fn collect_info(&self, config: &mut AuthConfig, info: &mut AuthInfo) -> Result<()> {
        if config.location() == AuthLocation::Any {
            return Err(config.no_config());
        }

        if !info.refreshable {
            let status = TokenStatus::at(config.selected()?.expires_at, Utc::now());
            info.access_token = Some(status);
            if status.is_expired() {
                return Ok(());
            }
        }

        let session = self.ctx.sessions().session(config).await?;
        let account_id = session.account_id.as_deref().unwrap_or(CURRENT_ACCOUNT);
        let account = session
            .api
            .get_account(&session.access_token, account_id)
            .await?;

        info.account_id = Some(account.id);
        info.username = Some(account.username);
        info.email = account.email;
        Ok(())
    }

    /// Make an account the default of the local or global auth file; asks
    /// which one when `account` is not given
    pub async fn select(&self, local: bool, account: Option<&str>) -> Result<String> {
        let mut config = self.existing_file(local).await?;

        let id = match account {
            Some(id) => id.to_string(),
            None => {
                let groups = config.registry().groups(self.ctx.default_endpoint());
                choose_account(self.ctx.prompter(), &groups)?
            }
        };

        config.registry_mut().set_default(&id)?;
        config.select_account(id.clone());
        config.save(false).await?;
        info!("Default account is now {}", id);
        Ok(id)
    }

    /// Accounts of the local or global auth file grouped by endpoint
    pub async fn list(&self, local: bool) -> Result<Vec<AccountGroup>> {
        let config = self.existing_file(local).await?;
        Ok(config.registry().groups(self.ctx.default_endpoint()))
    }

    async fn existing_file(&self, local: bool) -> Result<AuthConfig> {
        let config = AuthConfig::load(Self::file_location(local), &self.ctx.paths, None).await?;
        if !config.exists() {
            return Err(config.no_config());
        }
        Ok(config)
    }
}
