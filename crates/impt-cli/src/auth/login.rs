//! Turning credentials into tokens

use crate::error::{CliError, Result};
use crate::interactive::{LoginMethod, Prompter};
use impt_sdk::{AccessToken, ApiError, ImpCentralApi};
use tracing::debug;

/// What a login authenticates with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginCredentials {
    LoginKey(String),
    UserPassword {
        user: String,
        password: Option<String>,
    },
}

impl LoginCredentials {
    /// Pick credentials from optional inputs; a login key wins over a user
    pub fn from_options(
        login_key: Option<String>,
        user: Option<String>,
        password: Option<String>,
    ) -> Option<Self> {
        match (login_key, user) {
            (Some(key), _) => Some(LoginCredentials::LoginKey(key)),
            (None, Some(user)) => Some(LoginCredentials::UserPassword { user, password }),
            (None, None) => None,
        }
    }

    /// Use the given credentials, or ask for a method and the credentials
    pub fn or_prompt(given: Option<Self>, prompter: &dyn Prompter) -> Result<Self> {
        if let Some(credentials) = given {
            return Ok(credentials);
        }
        match LoginMethod::prompt(prompter)? {
            LoginMethod::LoginKey => Ok(LoginCredentials::LoginKey(
                prompter.password("Login key")?,
            )),
            LoginMethod::UserPassword => Ok(LoginCredentials::UserPassword {
                user: prompter.input("Username or email address")?,
                password: None,
            }),
        }
    }

    pub fn login_key(&self) -> Option<&str> {
        match self {
            LoginCredentials::LoginKey(key) => Some(key),
            LoginCredentials::UserPassword { .. } => None,
        }
    }

    pub fn method(&self) -> LoginMethod {
        match self {
            LoginCredentials::LoginKey(_) => LoginMethod::LoginKey,
            LoginCredentials::UserPassword { .. } => LoginMethod::UserPassword,
        }
    }
}

/// Obtain tokens, stepping up with a one-time password when the platform
/// asks for one
pub async fn authenticate(
    api: &dyn ImpCentralApi,
    credentials: &LoginCredentials,
    prompter: &dyn Prompter,
) -> Result<AccessToken> {
    let (user, password) = match credentials {
        LoginCredentials::LoginKey(key) => {
            debug!("Authenticating with login key");
            return Ok(api.get_access_token(key).await?);
        }
        LoginCredentials::UserPassword { user, password } => (user, password),
    };

    let password = match password {
        Some(password) => password.clone(),
        None => prompter.password("Password")?,
    };

    debug!("Authenticating as {}", user);
    match api.login(user, &password).await {
        Ok(token) => Ok(token),
        Err(ApiError::OtpRequired {
            login_token: Some(login_token),
        }) => {
            debug!("One-time password required");
            let otp = prompter.password("One-time password")?;
            Ok(api.login_with_otp(&otp, &login_token).await?)
        }
        Err(ApiError::OtpRequired { login_token: None }) => Err(
            CliError::UnexpectedResponseFormat(
                "one-time password requested without a login token".to_string(),
            ),
        ),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_key_wins_over_user() {
        let credentials = LoginCredentials::from_options(
            Some("key".into()),
            Some("alice".into()),
            Some("secret".into()),
        );
        assert_eq!(credentials, Some(LoginCredentials::LoginKey("key".into())));
    }

    #[test]
    fn test_user_without_password() {
        let credentials = LoginCredentials::from_options(None, Some("alice".into()), None).unwrap();
        assert_eq!(credentials.method(), LoginMethod::UserPassword);
        assert!(credentials.login_key().is_none());
    }

    #[test]
    fn test_nothing_given() {
        assert!(LoginCredentials::from_options(None, None, Some("secret".into())).is_none());
    }
}
