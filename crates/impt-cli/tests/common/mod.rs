//! Fakes shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use impt_cli::auth::{AuthEnv, AuthPaths};
use impt_cli::client::ApiConnector;
use impt_cli::config::CliConfig;
use impt_cli::context::Context;
use impt_cli::error::Result as CliResult;
use impt_cli::interactive::Prompter;
use impt_sdk::{AccessToken, Account, ApiError, DeviceGroup, ImpCentralApi};
use serde_json::Value;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// In-memory platform.
///
/// Tokens are `tok-<who>`; the account owning `tok-<who>` is `acc-<who>`.
#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<String>>,
    /// When set, password logins fail with OTP-required carrying this token
    pub otp_login_token: Option<Option<String>>,
    pub missing_groups: Vec<String>,
    pub broken_groups: Vec<String>,
    pub failing_accounts: Vec<String>,
}

impl FakeApi {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn token(who: &str, refresh: bool) -> AccessToken {
        AccessToken {
            access_token: format!("tok-{who}"),
            expires_at: Utc::now() + Duration::hours(1),
            expires_in: Some(3600),
            refresh_token: refresh.then(|| format!("refresh-{who}")),
        }
    }
}

#[async_trait]
impl ImpCentralApi for FakeApi {
    async fn login(&self, user: &str, password: &str) -> impt_sdk::Result<AccessToken> {
        self.record(format!("login:{user}:{password}"));
        if let Some(login_token) = &self.otp_login_token {
            return Err(ApiError::OtpRequired {
                login_token: login_token.clone(),
            });
        }
        Ok(Self::token(user, true))
    }

    async fn login_with_otp(&self, otp: &str, login_token: &str) -> impt_sdk::Result<AccessToken> {
        self.record(format!("login_with_otp:{otp}:{login_token}"));
        Ok(Self::token("otp", true))
    }

    async fn get_access_token(&self, login_key: &str) -> impt_sdk::Result<AccessToken> {
        self.record(format!("get_access_token:{login_key}"));
        Ok(Self::token(login_key, false))
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> impt_sdk::Result<AccessToken> {
        self.record(format!("refresh_access_token:{refresh_token}"));
        Ok(Self::token("refreshed", false))
    }

    async fn get_account(&self, access_token: &str, account_id: &str) -> impt_sdk::Result<Account> {
        self.record(format!("get_account:{account_id}"));
        let id = if account_id == "me" {
            format!("acc-{}", access_token.trim_start_matches("tok-"))
        } else {
            account_id.to_string()
        };
        if self.failing_accounts.contains(&id) {
            return Err(ApiError::Authentication {
                message: "invalid token".into(),
            });
        }
        Ok(Account {
            username: id.trim_start_matches("acc-").to_string(),
            email: Some(format!("{id}@example.com")),
            id,
        })
    }

    async fn get_device_group(
        &self,
        _access_token: &str,
        device_group_id: &str,
    ) -> impt_sdk::Result<DeviceGroup> {
        self.record(format!("get_device_group:{device_group_id}"));
        if self.missing_groups.iter().any(|g| g == device_group_id) {
            return Err(ApiError::NotFound {
                resource: format!("devicegroups/{device_group_id}"),
            });
        }
        if self.broken_groups.iter().any(|g| g == device_group_id) {
            return Err(ApiError::Internal {
                message: "server error".into(),
            });
        }
        Ok(DeviceGroup {
            id: device_group_id.to_string(),
            kind: "development_devicegroup".into(),
            name: format!("Group {device_group_id}"),
            description: None,
            product_id: Some("prod-1".into()),
        })
    }
}

pub struct FakeConnector {
    pub api: Arc<FakeApi>,
    pub endpoints: Mutex<Vec<String>>,
}

impl ApiConnector for FakeConnector {
    fn connect(&self, endpoint: &str) -> CliResult<Arc<dyn ImpCentralApi>> {
        self.endpoints.lock().unwrap().push(endpoint.to_string());
        Ok(self.api.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Text(String),
    Confirm(bool),
    Select(usize),
}

/// Prompter answering from a script; panics when the script runs out
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap().len()
    }

    fn next(&self, prompt: &str) -> Answer {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt: {prompt}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, prompt: &str) -> CliResult<String> {
        match self.next(prompt) {
            Answer::Text(text) => Ok(text),
            other => panic!("expected text for {prompt}, scripted {other:?}"),
        }
    }

    fn password(&self, prompt: &str) -> CliResult<String> {
        self.input(prompt)
    }

    fn confirm(&self, prompt: &str, _default: bool) -> CliResult<bool> {
        match self.next(prompt) {
            Answer::Confirm(answer) => Ok(answer),
            other => panic!("expected confirmation for {prompt}, scripted {other:?}"),
        }
    }

    fn select(&self, prompt: &str, _items: &[String], _default: usize) -> CliResult<usize> {
        match self.next(prompt) {
            Answer::Select(index) => Ok(index),
            other => panic!("expected selection for {prompt}, scripted {other:?}"),
        }
    }
}

/// Isolated working and home directories with fake collaborators
pub struct TestEnv {
    pub local: TempDir,
    pub home: TempDir,
    pub api: Arc<FakeApi>,
    pub connector: Arc<FakeConnector>,
    pub prompter: Arc<ScriptedPrompter>,
    pub env: AuthEnv,
}

impl TestEnv {
    pub fn new(api: FakeApi, answers: Vec<Answer>) -> Self {
        let api = Arc::new(api);
        Self {
            local: TempDir::new().unwrap(),
            home: TempDir::new().unwrap(),
            connector: Arc::new(FakeConnector {
                api: api.clone(),
                endpoints: Mutex::new(Vec::new()),
            }),
            api,
            prompter: Arc::new(ScriptedPrompter::new(answers)),
            env: AuthEnv::default(),
        }
    }

    pub fn context(&self) -> Context {
        Context {
            settings: CliConfig::default(),
            paths: AuthPaths::new(self.local.path(), Some(self.home.path().to_path_buf())),
            env: self.env.clone(),
            connector: self.connector.clone(),
            prompter: self.prompter.clone(),
        }
    }

    pub fn global_auth_path(&self) -> PathBuf {
        self.home.path().join(".impt.auth")
    }

    pub fn local_path(&self, name: &str) -> PathBuf {
        self.local.path().join(name)
    }

    pub fn write_json(&self, path: PathBuf, value: Value) {
        std::fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    pub fn read_json(&self, path: PathBuf) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    pub fn write_global_auth(&self, value: Value) {
        self.write_json(self.global_auth_path(), value);
    }

    pub fn global_auth(&self) -> Value {
        self.read_json(self.global_auth_path())
    }
}

/// RFC 3339 timestamp `minutes` from now
pub fn in_minutes(minutes: i64) -> String {
    (Utc::now() + Duration::minutes(minutes)).to_rfc3339()
}

/// RFC 3339 timestamp `seconds` from now
pub fn in_seconds(seconds: i64) -> String {
    (Utc::now() + Duration::seconds(seconds)).to_rfc3339()
}
