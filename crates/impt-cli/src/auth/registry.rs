//! Account registry stored in an auth file
//!
//! An auth file is a JSON object keyed by account id. Key order is kept so
//! that listings and interactive menus are stable across runs.

use crate::error::{CliError, Result};
use chrono::{DateTime, Utc};
use impt_sdk::AccessToken;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Credentials and tokens for one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
    /// Other account ids whose device groups this account can reach
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<String>,
    /// Keys written by other tools or newer versions
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AccountRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Replace the tokens after a refresh; the refresh token is only replaced
    /// when the platform issued a new one
    pub fn apply_token(&mut self, token: AccessToken) {
        self.access_token = token.access_token;
        self.expires_at = token.expires_at;
        if let Some(refresh_token) = token.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
    }

    /// Drop the long-lived credentials
    pub fn strip_secrets(&mut self) {
        self.login_key = None;
        self.refresh_token = None;
    }
}

/// Tokens from a login that has not yet been attributed to an account
#[derive(Debug, Clone)]
pub struct PendingSession {
    pub endpoint: Option<String>,
    pub token: AccessToken,
    pub login_key: Option<String>,
}

impl PendingSession {
    pub fn new(endpoint: Option<String>, token: AccessToken, login_key: Option<String>) -> Self {
        Self {
            endpoint,
            token,
            login_key,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.token.access_token
    }
}

/// One line of an account listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountEntry {
    /// 1-based position in the whole registry
    pub position: usize,
    pub id: String,
    pub user_name: Option<String>,
    pub is_default: bool,
}

impl fmt::Display for AccountEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.user_name.as_deref().unwrap_or("-"))?;
        if self.is_default {
            write!(f, " (default)")?;
        }
        Ok(())
    }
}

/// Accounts that share an endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountGroup {
    pub endpoint: String,
    pub accounts: Vec<AccountEntry>,
}

/// Ordered account id → record map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountRegistry {
    accounts: IndexMap<String, AccountRecord>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn get(&self, id: &str) -> Option<&AccountRecord> {
        self.accounts.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut AccountRecord> {
        self.accounts.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.accounts.contains_key(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.accounts.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AccountRecord)> {
        self.accounts.iter()
    }

    /// Id of the default account, if any
    pub fn default_id(&self) -> Option<&str> {
        self.accounts
            .iter()
            .find(|(_, record)| record.is_default)
            .map(|(id, _)| id.as_str())
    }

    pub fn clear_defaults(&mut self) {
        for record in self.accounts.values_mut() {
            record.is_default = false;
        }
    }

    /// Make `id` the only default account
    pub fn set_default(&mut self, id: &str) -> Result<()> {
        if !self.contains(id) {
            return Err(CliError::not_found("Account", id));
        }
        self.clear_defaults();
        if let Some(record) = self.accounts.get_mut(id) {
            record.is_default = true;
        }
        Ok(())
    }

    pub fn insert(&mut self, id: impl Into<String>, record: AccountRecord) -> Option<AccountRecord> {
        self.accounts.insert(id.into(), record)
    }

    pub fn remove(&mut self, id: &str) -> Option<AccountRecord> {
        self.accounts.shift_remove(id)
    }

    /// Store a completed login under the account id it authenticated.
    ///
    /// Shared-account links and unknown keys of an existing record survive
    /// the re-login. The record becomes default when `make_default` is set,
    /// when it already was the default, or when no account is default yet.
    pub fn commit_pending(
        &mut self,
        account_id: &str,
        user_name: Option<String>,
        pending: PendingSession,
        make_default: bool,
        temp: bool,
    ) -> &AccountRecord {
        let previous = self.accounts.get(account_id);
        let was_default = previous.map(|r| r.is_default).unwrap_or(false);
        let (accounts, extra) = previous
            .map(|r| (r.accounts.clone(), r.extra.clone()))
            .unwrap_or_default();

        let is_default = make_default || was_default || self.default_id().is_none();
        if is_default {
            self.clear_defaults();
        }

        let mut record = AccountRecord {
            endpoint: pending.endpoint,
            access_token: pending.token.access_token,
            expires_at: pending.token.expires_at,
            refresh_token: pending.token.refresh_token,
            login_key: pending.login_key,
            user_name,
            is_default,
            accounts,
            extra,
        };
        if temp {
            record.strip_secrets();
        }

        let index = self.accounts.insert_full(account_id.to_string(), record).0;
        &self.accounts[index]
    }

    /// Accounts grouped by endpoint, in order of first appearance
    pub fn groups(&self, default_endpoint: &str) -> Vec<AccountGroup> {
        let mut groups: Vec<AccountGroup> = Vec::new();

        for (index, (id, record)) in self.accounts.iter().enumerate() {
            let endpoint = record.endpoint.as_deref().unwrap_or(default_endpoint);
            let entry = AccountEntry {
                position: index + 1,
                id: id.clone(),
                user_name: record.user_name.clone(),
                is_default: record.is_default,
            };

            match groups.iter_mut().find(|g| g.endpoint == endpoint) {
                Some(group) => group.accounts.push(entry),
                None => groups.push(AccountGroup {
                    endpoint: endpoint.to_string(),
                    accounts: vec![entry],
                }),
            }
        }

        groups
    }

    /// Account to use for something recorded under `recorded_id`: the account
    /// itself, or the first account it is shared with
    pub fn resolve_shared(&self, recorded_id: &str) -> Option<&str> {
        if let Some((id, _)) = self.accounts.get_key_value(recorded_id) {
            return Some(id.as_str());
        }
        self.accounts
            .iter()
            .find(|(_, record)| record.accounts.iter().any(|a| a == recorded_id))
            .map(|(id, _)| id.as_str())
    }
}
