//! Creation of impCentral API clients for the CLI
//!
//! Accounts may live on different endpoints, so commands ask an
//! [`ApiConnector`] for a client per endpoint instead of holding one.

use crate::config::CliConfig;
use crate::error::Result;
use impt_sdk::{ClientBuilder, ImpCentralApi};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Hands out API clients by endpoint
pub trait ApiConnector: Send + Sync {
    fn connect(&self, endpoint: &str) -> Result<Arc<dyn ImpCentralApi>>;
}

/// Connector producing reqwest-backed clients
#[derive(Debug, Clone)]
pub struct HttpConnector {
    timeout: Duration,
}

impl HttpConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &CliConfig) -> Self {
        Self::new(Duration::from_secs(config.api.timeout_secs))
    }
}

impl ApiConnector for HttpConnector {
    fn connect(&self, endpoint: &str) -> Result<Arc<dyn ImpCentralApi>> {
        debug!("Creating API client for {}", endpoint);
        let client = ClientBuilder::default()
            .base_url(endpoint)
            .timeout(self.timeout)
            .build()?;
        Ok(Arc::new(client))
    }
}
