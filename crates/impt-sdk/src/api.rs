//! The platform operations the credential layer relies on

use crate::error::Result;
use crate::types::{AccessToken, Account, DeviceGroup};
use async_trait::async_trait;

/// Account id the platform resolves to the owner of the access token
pub const CURRENT_ACCOUNT: &str = "me";

/// impCentral operations used by the CLI
///
/// Implemented by [`crate::ImpCentralClient`]; tests substitute fakes.
#[async_trait]
pub trait ImpCentralApi: Send + Sync {
    /// Username/email + password login.
    ///
    /// Fails with [`crate::ApiError::OtpRequired`] when the account has
    /// two-factor authentication enabled.
    async fn login(&self, user: &str, password: &str) -> Result<AccessToken>;

    /// Second login step with a one-time password and the login token from the
    /// OTP-required error.
    async fn login_with_otp(&self, otp: &str, login_token: &str) -> Result<AccessToken>;

    /// Exchange a login key for an access token
    async fn get_access_token(&self, login_key: &str) -> Result<AccessToken>;

    /// Exchange a refresh token for a new access token
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<AccessToken>;

    /// Look up an account; [`CURRENT_ACCOUNT`] for the token owner
    async fn get_account(&self, access_token: &str, account_id: &str) -> Result<Account>;

    /// Look up a device group by id
    async fn get_device_group(&self, access_token: &str, device_group_id: &str)
        -> Result<DeviceGroup>;
}
