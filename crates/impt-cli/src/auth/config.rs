//! Resolved auth configuration
//!
//! An [`AuthConfig`] is the registry of one credential source together with
//! the account an operation should act as.

use super::location::{auth_file_in, AuthEnv, AuthLocation, AuthPaths};
use super::registry::{AccountRecord, AccountRegistry};
use crate::error::{CliError, ConfigKind, Result};
use crate::output::compress_path;
use crate::storage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Credentials taken from the environment
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    pub endpoint: Option<String>,
    pub login_key: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    location: AuthLocation,
    /// Auth file; `None` for environment and unresolved configs
    path: Option<PathBuf>,
    /// Whether `path` existed when loaded or has been saved since
    exists: bool,
    registry: AccountRegistry,
    account_id: Option<String>,
    env_credentials: Option<EnvCredentials>,
}

impl AuthConfig {
    /// Find the credential source for commands that do not name one.
    ///
    /// Local file, then `IMPT_AUTH_FILE_PATH`, then environment credentials,
    /// then the global file.
    pub async fn resolve(
        paths: &AuthPaths,
        env: &AuthEnv,
        account_override: Option<&str>,
    ) -> Result<Self> {
        let local = paths.local_auth_file();
        if local.exists() {
            debug!("Using local auth file {}", local.display());
            return Self::open(AuthLocation::Local, local, account_override).await;
        }

        if let Some(dir) = &env.auth_file_path {
            let path = auth_file_in(dir);
            debug!("Using auth file from environment {}", path.display());
            return Self::open(AuthLocation::FilePath, path, account_override).await;
        }

        if env.has_credentials() {
            debug!("Using credentials from environment variables");
            return Ok(Self::from_env(env));
        }

        if let Some(global) = paths.global_auth_file().filter(|p| p.exists()) {
            debug!("Using global auth file {}", global.display());
            return Self::open(AuthLocation::Global, global, account_override).await;
        }

        debug!("No auth configuration found");
        Ok(Self::unresolved())
    }

    /// Open the local or global auth file directly
    pub async fn load(
        location: AuthLocation,
        paths: &AuthPaths,
        account_override: Option<&str>,
    ) -> Result<Self> {
        let path = match location {
            AuthLocation::Local => paths.local_auth_file(),
            AuthLocation::Global => paths.global_auth_file().ok_or_else(|| {
                CliError::internal("Cannot determine the home directory for the global auth file")
            })?,
            other => {
                return Err(CliError::internal(format!(
                    "{other} auth configuration cannot be opened directly"
                )))
            }
        };
        Self::open(location, path, account_override).await
    }

    async fn open(
        location: AuthLocation,
        path: PathBuf,
        account_override: Option<&str>,
    ) -> Result<Self> {
        let loaded: Option<AccountRegistry> =
            storage::read_json_file(&path, ConfigKind::Auth).await?;
        let exists = loaded.is_some();
        let registry = loaded.unwrap_or_default();

        let account_id = account_override
            .map(str::to_string)
            .or_else(|| registry.default_id().map(str::to_string));

        Ok(Self {
            location,
            path: Some(path),
            exists,
            registry,
            account_id,
            env_credentials: None,
        })
    }

    fn from_env(env: &AuthEnv) -> Self {
        Self {
            location: AuthLocation::EnvVars,
            path: None,
            exists: true,
            registry: AccountRegistry::new(),
            account_id: None,
            env_credentials: Some(EnvCredentials {
                endpoint: env.endpoint.clone(),
                login_key: env.login_key.clone(),
                user: env.user.clone(),
                password: env.password.clone(),
            }),
        }
    }

    fn unresolved() -> Self {
        Self {
            location: AuthLocation::Any,
            path: None,
            exists: false,
            registry: AccountRegistry::new(),
            account_id: None,
            env_credentials: None,
        }
    }

    pub fn location(&self) -> AuthLocation {
        self.location
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether there is anything to authenticate with
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AccountRegistry {
        &mut self.registry
    }

    pub fn env_credentials(&self) -> Option<&EnvCredentials> {
        self.env_credentials.as_ref()
    }

    /// Account operations act as
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Act as `id` for the rest of this invocation without changing the default
    pub fn select_account(&mut self, id: impl Into<String>) {
        self.account_id = Some(id.into());
    }

    /// Replace the selection; `None` leaves no account selected
    pub fn set_account(&mut self, id: Option<String>) {
        self.account_id = id;
    }

    /// Record of the selected account
    pub fn selected(&self) -> Result<&AccountRecord> {
        self.account_id
            .as_deref()
            .and_then(|id| self.registry.get(id))
            .ok_or_else(|| self.no_config())
    }

    pub fn selected_mut(&mut self) -> Result<&mut AccountRecord> {
        let no_config = self.no_config();
        match self.account_id.as_deref() {
            Some(id) => self.registry.get_mut(id).ok_or(no_config),
            None => Err(no_config),
        }
    }

    /// Endpoint of the selected account, falling back to `default_endpoint`
    pub fn endpoint(&self, default_endpoint: &str) -> String {
        let configured = match &self.env_credentials {
            Some(env) => env.endpoint.clone(),
            None => self.selected().ok().and_then(|r| r.endpoint.clone()),
        };
        configured.unwrap_or_else(|| default_endpoint.to_string())
    }

    pub fn login_key(&self) -> Option<&str> {
        match &self.env_credentials {
            Some(env) => env.login_key.as_deref(),
            None => self.selected().ok().and_then(|r| r.login_key.as_deref()),
        }
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.selected().ok().and_then(|r| r.refresh_token.as_deref())
    }

    /// Whether an expired access token can be replaced without the user
    pub fn can_refresh_token(&self) -> bool {
        self.location == AuthLocation::EnvVars
            || self.login_key().is_some()
            || self.refresh_token().is_some()
    }

    /// Human-readable credential source
    pub fn auth_type(&self) -> String {
        match self.location {
            AuthLocation::Local => "Local auth file".to_string(),
            AuthLocation::Global => "Global auth file".to_string(),
            AuthLocation::FilePath => match &self.path {
                Some(path) => format!("Auth file path: {}", compress_path(path)),
                None => "Auth file path".to_string(),
            },
            AuthLocation::EnvVars => "Environment variables".to_string(),
            AuthLocation::Any => "None".to_string(),
        }
    }

    /// Error for when this config cannot supply what an operation needs
    pub fn no_config(&self) -> CliError {
        let location = match (&self.location, &self.path) {
            (AuthLocation::Any, _) => {
                "no local, global or environment credentials; run 'impt auth login'".to_string()
            }
            (_, Some(path)) if !self.exists => {
                format!("{} auth file {}", self.location, compress_path(path))
            }
            (_, _) => match &self.account_id {
                Some(id) => format!("account \"{id}\" in {}", self.auth_type()),
                None => format!("no default account in {}", self.auth_type()),
            },
        };
        CliError::NoConfig {
            kind: ConfigKind::Auth,
            location,
        }
    }

    /// Write the registry back.
    ///
    /// With `temp` the selected account's login key and refresh token are not
    /// stored. Environment configs are never written.
    pub async fn save(&mut self, temp: bool) -> Result<()> {
        if temp {
            if let Ok(record) = self.selected_mut() {
                record.strip_secrets();
            }
        }

        match (&self.location, &self.path) {
            (AuthLocation::EnvVars, _) => Ok(()),
            (_, Some(path)) => {
                storage::write_json_file(path, &self.registry).await?;
                self.exists = true;
                info!("Saved auth config to {}", path.display());
                Ok(())
            }
            (_, None) => Err(self.no_config()),
        }
    }

    /// Remove the auth file
    pub async fn delete(&mut self) -> Result<()> {
        if !self.exists {
            return Err(self.no_config());
        }
        match &self.path {
            Some(path) => {
                storage::remove_file(path).await?;
                info!("Removed auth config {}", path.display());
                self.exists = false;
                self.registry = AccountRegistry::new();
                self.account_id = None;
                Ok(())
            }
            None => Err(self.no_config()),
        }
    }
}
