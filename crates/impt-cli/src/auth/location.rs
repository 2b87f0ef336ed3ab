//! Where credentials come from
//!
//! [`AuthPaths`] and [`AuthEnv`] are snapshots of the filesystem roots and
//! environment variables the resolver looks at, taken once per invocation so
//! that resolution is a pure function of its inputs.

use impt_common::{
    AUTH_CONFIG_FILE_NAME, ENV_VAR_AUTH_FILE_PATH, ENV_VAR_ENDPOINT, ENV_VAR_LOGINKEY,
    ENV_VAR_PASSWORD, ENV_VAR_USER,
};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Credential source an [`super::AuthConfig`] was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthLocation {
    /// `./.impt.auth`
    Local,
    /// `<home>/.impt.auth`
    Global,
    /// `$IMPT_AUTH_FILE_PATH/.impt.auth`
    FilePath,
    /// `IMPT_LOGINKEY` / `IMPT_USER` / `IMPT_PASSWORD`; never persisted
    EnvVars,
    /// Nothing found
    Any,
}

impl fmt::Display for AuthLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthLocation::Local => "Local",
            AuthLocation::Global => "Global",
            AuthLocation::FilePath => "File path",
            AuthLocation::EnvVars => "Environment variables",
            AuthLocation::Any => "Any",
        };
        f.write_str(name)
    }
}

/// Directories probed for auth files
#[derive(Debug, Clone)]
pub struct AuthPaths {
    /// Working directory; holds the local auth file and the project files
    pub local_dir: PathBuf,
    /// Home directory; holds the global auth file
    pub home_dir: Option<PathBuf>,
}

impl AuthPaths {
    pub fn new(local_dir: impl Into<PathBuf>, home_dir: Option<PathBuf>) -> Self {
        Self {
            local_dir: local_dir.into(),
            home_dir,
        }
    }

    /// Current directory and the user's home directory
    pub fn from_system() -> std::io::Result<Self> {
        Ok(Self {
            local_dir: std::env::current_dir()?,
            home_dir: etcetera::home_dir().ok(),
        })
    }

    pub fn local_auth_file(&self) -> PathBuf {
        auth_file_in(&self.local_dir)
    }

    pub fn global_auth_file(&self) -> Option<PathBuf> {
        self.home_dir.as_deref().map(auth_file_in)
    }
}

/// Auth file inside a directory
pub fn auth_file_in(dir: &Path) -> PathBuf {
    dir.join(AUTH_CONFIG_FILE_NAME)
}

/// Snapshot of the auth-related environment variables.
///
/// Empty values count as unset.
#[derive(Debug, Clone, Default)]
pub struct AuthEnv {
    pub auth_file_path: Option<PathBuf>,
    pub login_key: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub endpoint: Option<String>,
}

impl AuthEnv {
    /// Read the variables from the process environment
    pub fn from_process() -> Self {
        Self {
            auth_file_path: non_empty_var(ENV_VAR_AUTH_FILE_PATH).map(PathBuf::from),
            login_key: non_empty_var(ENV_VAR_LOGINKEY),
            user: non_empty_var(ENV_VAR_USER),
            password: non_empty_var(ENV_VAR_PASSWORD),
            endpoint: non_empty_var(ENV_VAR_ENDPOINT),
        }
    }

    /// Whether `IMPT_LOGINKEY` or `IMPT_USER` makes environment credentials usable
    pub fn has_credentials(&self) -> bool {
        self.login_key.is_some() || self.user.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
