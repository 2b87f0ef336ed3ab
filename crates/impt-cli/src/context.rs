//! Everything a command needs from the outside world

use crate::auth::{AuthEnv, AuthPaths, SessionManager};
use crate::client::{ApiConnector, HttpConnector};
use crate::config::CliConfig;
use crate::error::Result;
use crate::interactive::{InteractiveSelector, Prompter};
use std::sync::Arc;

pub struct Context {
    pub settings: CliConfig,
    pub paths: AuthPaths,
    pub env: AuthEnv,
    pub connector: Arc<dyn ApiConnector>,
    pub prompter: Arc<dyn Prompter>,
}

impl Context {
    /// Context for a real invocation: current directory, home directory,
    /// process environment, HTTP clients and terminal prompts
    pub fn from_system(settings: CliConfig) -> Result<Self> {
        let connector = Arc::new(HttpConnector::from_config(&settings));
        Ok(Self {
            paths: AuthPaths::from_system()?,
            env: AuthEnv::from_process(),
            connector,
            prompter: Arc::new(InteractiveSelector::new()),
            settings,
        })
    }

    pub fn default_endpoint(&self) -> &str {
        &self.settings.api.endpoint
    }

    pub fn prompter(&self) -> &dyn Prompter {
        self.prompter.as_ref()
    }

    pub fn sessions(&self) -> SessionManager<'_> {
        SessionManager::new(self)
    }
}
