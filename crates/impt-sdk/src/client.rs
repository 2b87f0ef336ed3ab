//! HTTP client for the impCentral API
//!
//! Authentication calls (`/auth`, `/auth/token`) take plain JSON; entity
//! lookups use JSON:API documents and a bearer token passed per call, so a
//! single client can serve several accounts on the same endpoint.
//!
//! ```rust,no_run
//! use impt_sdk::{ClientBuilder, ImpCentralApi};
//!
//! # async fn example() -> impt_sdk::Result<()> {
//! let client = ClientBuilder::default()
//!     .base_url("https://api.electricimp.com/v5")
//!     .build()?;
//!
//! let token = client.get_access_token("my-login-key").await?;
//! let account = client.get_account(&token.access_token, "me").await?;
//! println!("{}", account.username);
//! # Ok(())
//! # }
//! ```

use crate::{
    api::ImpCentralApi,
    error::{ApiError, ErrorResponse, Result},
    types::{
        AccessToken, Account, AccountAttributes, DeviceGroup, DeviceGroupAttributes, Document,
        LoginKeyRequest, OtpLoginRequest, PasswordLoginRequest, RefreshTokenRequest,
    },
};
use async_trait::async_trait;
use impt_common::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;

const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// HTTP client for interacting with the impCentral API
#[derive(Debug, Clone)]
pub struct ImpCentralClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ImpCentralClient {
    fn new(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        let base_url: String = base_url.into();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Endpoint this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ===== Private Helper Methods =====

    /// POST a plain JSON body to an unauthenticated auth route
    async fn post_auth<B: Serialize>(&self, path: &str, body: &B) -> Result<AccessToken> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);
        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::HttpClient)?;
        self.handle_response(response).await
    }

    /// Authenticated JSON:API GET
    async fn get<T: DeserializeOwned>(&self, access_token: &str, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let request = self
            .http_client
            .get(&url)
            .header(reqwest::header::ACCEPT, JSON_API_CONTENT_TYPE);
        let request = apply_auth(request, access_token);

        let response = request.send().await.map_err(ApiError::HttpClient)?;
        self.handle_response(response).await
    }

    /// Handle successful response
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        if response.status().is_success() {
            let text = response.text().await.map_err(ApiError::HttpClient)?;
            serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse {
                message: e.to_string(),
            })
        } else {
            self.handle_error_response(response).await
        }
    }

    /// Handle error response
    async fn handle_error_response<T>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();

        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
                && error_response.is_otp_required()
            {
                return Err(ApiError::OtpRequired {
                    login_token: error_response.login_token(),
                });
            }

            let message = error_response.message();
            match status {
                StatusCode::UNAUTHORIZED => Err(ApiError::Authentication { message }),
                StatusCode::FORBIDDEN => Err(ApiError::Authorization { message }),
                StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimitExceeded),
                StatusCode::NOT_FOUND => Err(ApiError::NotFound { resource: message }),
                StatusCode::BAD_REQUEST => Err(ApiError::BadRequest { message }),
                _ => Err(ApiError::Internal { message }),
            }
        } else {
            match status {
                StatusCode::UNAUTHORIZED => Err(ApiError::Authentication {
                    message: "Authentication failed".into(),
                }),
                StatusCode::FORBIDDEN => Err(ApiError::Authorization {
                    message: "Access forbidden".into(),
                }),
                StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimitExceeded),
                StatusCode::NOT_FOUND => Err(ApiError::NotFound {
                    resource: "Resource not found".into(),
                }),
                StatusCode::BAD_REQUEST => Err(ApiError::BadRequest {
                    message: error_text,
                }),
                _ => Err(ApiError::Internal {
                    message: format!("Request failed with status {status}: {error_text}"),
                }),
            }
        }
    }
}

fn apply_auth(request: RequestBuilder, access_token: &str) -> RequestBuilder {
    request.header("Authorization", format!("Bearer {}", access_token))
}

#[async_trait]
impl ImpCentralApi for ImpCentralClient {
    async fn login(&self, user: &str, password: &str) -> Result<AccessToken> {
        self.post_auth("/auth", &PasswordLoginRequest { id: user, password })
            .await
    }

    async fn login_with_otp(&self, otp: &str, login_token: &str) -> Result<AccessToken> {
        self.post_auth("/auth", &OtpLoginRequest { otp, login_token })
            .await
    }

    async fn get_access_token(&self, login_key: &str) -> Result<AccessToken> {
        self.post_auth("/auth/token", &LoginKeyRequest { key: login_key })
            .await
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<AccessToken> {
        self.post_auth(
            "/auth/token",
            &RefreshTokenRequest {
                token: refresh_token,
            },
        )
        .await
    }

    async fn get_account(&self, access_token: &str, account_id: &str) -> Result<Account> {
        let path = format!("/accounts/{account_id}");
        let doc: Document<AccountAttributes> = self.get(access_token, &path).await?;
        Ok(doc.into())
    }

    async fn get_device_group(
        &self,
        access_token: &str,
        device_group_id: &str,
    ) -> Result<DeviceGroup> {
        let path = format!("/devicegroups/{device_group_id}");
        let doc: Document<DeviceGroupAttributes> = self.get(access_token, &path).await?;
        Ok(doc.into())
    }
}

/// Builder for constructing an ImpCentralClient with custom configuration
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL for the API
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ImpCentralClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let mut http = reqwest::Client::builder().timeout(timeout);
        if let Some(connect_timeout) = self.connect_timeout {
            http = http.connect_timeout(connect_timeout);
        }
        let http_client = http.build().map_err(ApiError::HttpClient)?;

        Ok(ImpCentralClient::new(base_url, http_client))
    }
}
