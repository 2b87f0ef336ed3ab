//! Wire types for the impCentral API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token grant returned by `/auth` and `/auth/token`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Bearer token for API requests
    pub access_token: String,
    /// Absolute expiry time
    pub expires_at: DateTime<Utc>,
    /// Lifetime in seconds as reported by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Only present for username/password logins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Account as returned by `/accounts/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Device group as returned by `/devicegroups/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceGroup {
    pub id: String,
    /// JSON:API resource type, e.g. `development_devicegroup`
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
}

// ===== JSON:API envelopes =====

/// Top-level JSON:API document with a single resource
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Document<A> {
    pub data: Resource<A>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Resource<A> {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: A,
    #[serde(default)]
    pub relationships: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AccountAttributes {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DeviceGroupAttributes {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<Document<AccountAttributes>> for Account {
    fn from(doc: Document<AccountAttributes>) -> Self {
        Self {
            id: doc.data.id,
            username: doc.data.attributes.username,
            email: doc.data.attributes.email,
        }
    }
}

impl From<Document<DeviceGroupAttributes>> for DeviceGroup {
    fn from(doc: Document<DeviceGroupAttributes>) -> Self {
        let product_id = doc
            .data
            .relationships
            .as_ref()
            .and_then(|r| r.get("product"))
            .and_then(|p| p.get("id"))
            .and_then(|id| id.as_str())
            .map(str::to_string);

        Self {
            id: doc.data.id,
            kind: doc.data.kind,
            name: doc.data.attributes.name,
            description: doc.data.attributes.description,
            product_id,
        }
    }
}

// ===== Request bodies =====

#[derive(Debug, Serialize)]
pub(crate) struct PasswordLoginRequest<'a> {
    pub id: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct OtpLoginRequest<'a> {
    pub otp: &'a str,
    pub login_token: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginKeyRequest<'a> {
    pub key: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshTokenRequest<'a> {
    pub token: &'a str,
}
