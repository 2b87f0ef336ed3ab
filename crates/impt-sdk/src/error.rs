//! Error types for the impCentral API client

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error codes the platform uses to request a one-time password end with this suffix
const OTP_REQUIRED_CODE_SUFFIX: &str = "OTP_REQUIRED";

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Two-factor authentication is enabled and a one-time password is needed.
    /// `login_token` is taken from the first error object's `meta`.
    #[error("One-time password required")]
    OtpRequired { login_token: Option<String> },

    /// Authentication error (bad credentials, expired/invalid token)
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// Authorization error
    #[error("Authorization error: {message}")]
    Authorization { message: String },

    /// Resource not found
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Bad request
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Response body did not have the expected shape
    #[error("Unexpected response format: {message}")]
    InvalidResponse { message: String },

    /// Internal server error
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    /// Check if the error means the requested entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Check if the error is a request for a one-time password
    pub fn is_otp_required(&self) -> bool {
        matches!(self, ApiError::OtpRequired { .. })
    }
}

/// JSON:API error document returned by the platform
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorObject>,
}

/// A single error object
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorObject {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// First error object, which carries the code the platform wants us to act on
    pub fn first(&self) -> Option<&ErrorObject> {
        self.errors.first()
    }

    /// Human-readable message built from the first error object
    pub fn message(&self) -> String {
        match self.first() {
            Some(err) => err
                .detail
                .clone()
                .or_else(|| err.title.clone())
                .unwrap_or_else(|| err.code.clone()),
            None => "Unknown error".to_string(),
        }
    }

    /// Whether the first error asks for a one-time password
    pub fn is_otp_required(&self) -> bool {
        self.first()
            .map(|err| err.code.ends_with(OTP_REQUIRED_CODE_SUFFIX))
            .unwrap_or(false)
    }

    /// `meta.login_token` of the first error object, if present
    pub fn login_token(&self) -> Option<String> {
        self.first()?
            .meta
            .as_ref()?
            .get("login_token")?
            .as_str()
            .map(str::to_string)
    }
}
