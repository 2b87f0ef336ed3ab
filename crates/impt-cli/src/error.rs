//! Error types for the impt CLI

use color_eyre::eyre::Report;
use impt_sdk::ApiError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
    pub const AUTH_ERROR: i32 = 3;
    pub const INVALID_ARGS: i32 = 4;
    pub const PARTIAL_FAILURE: i32 = 5;
    pub const CANCELLED: i32 = 130;
}

/// Kind of persisted configuration an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Auth,
    Project,
    Settings,
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKind::Auth => write!(f, "Auth"),
            ConfigKind::Project => write!(f, "Project"),
            ConfigKind::Settings => write!(f, "Settings"),
        }
    }
}

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// A config that the command needs does not exist
    #[error("{kind} config is not found ({location})")]
    NoConfig { kind: ConfigKind, location: String },

    /// A config exists but cannot be used
    #[error("{kind} config {} is corrupted: {reason}", .path.display())]
    CorruptedConfig {
        kind: ConfigKind,
        path: PathBuf,
        reason: String,
    },

    /// A config refers to something that was deleted upstream
    #[error("{kind} \"{id}\" referenced in the project config no longer exists")]
    OutdatedConfigEntity { kind: &'static str, id: String },

    /// A named entity or file could not be found
    #[error("{kind} \"{name}\" is not found")]
    EntityNotFound { kind: &'static str, name: String },

    /// Stored access token is expired and there is nothing to refresh it with
    #[error("Access token for account \"{account}\" has expired. Run 'impt auth login' again")]
    TokenExpired { account: String },

    /// The platform answered with something we could not interpret
    #[error("Unexpected response format: {0}")]
    UnexpectedResponseFormat(String),

    /// Invalid command-line input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Prompt could not be shown or answered
    #[error("Interactive prompt failed: {0}")]
    Interactive(String),

    /// User backed out of a prompt
    #[error("Operation cancelled")]
    Cancelled,

    /// Some items of a bulk operation failed
    #[error("{failed} of {} operations failed", .succeeded + .failed)]
    PartialFailure { succeeded: usize, failed: usize },

    /// API communication errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Tool settings could not be loaded
    #[error("Settings error: {0}")]
    Settings(#[from] figment::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Everything else (using color-eyre's Report for rich errors)
    #[error(transparent)]
    Internal(#[from] Report),
}

impl CliError {
    pub fn internal(message: impl Into<String>) -> Self {
        CliError::Internal(Report::msg(message.into()))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CliError::InvalidArgument(message.into())
    }

    pub fn interactive(message: impl Into<String>) -> Self {
        CliError::Interactive(message.into())
    }

    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        CliError::EntityNotFound {
            kind,
            name: name.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NoConfig { .. }
            | CliError::CorruptedConfig { .. }
            | CliError::OutdatedConfigEntity { .. }
            | CliError::Settings(_) => exit_codes::CONFIG_ERROR,
            CliError::TokenExpired { .. } => exit_codes::AUTH_ERROR,
            CliError::Api(e) => match e {
                ApiError::Authentication { .. }
                | ApiError::Authorization { .. }
                | ApiError::OtpRequired { .. } => exit_codes::AUTH_ERROR,
                _ => exit_codes::GENERAL_ERROR,
            },
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
            CliError::PartialFailure { .. } => exit_codes::PARTIAL_FAILURE,
            CliError::Cancelled => exit_codes::CANCELLED,
            CliError::EntityNotFound { .. }
            | CliError::UnexpectedResponseFormat(_)
            | CliError::Interactive(_)
            | CliError::Io(_)
            | CliError::Serialization(_)
            | CliError::Internal(_) => exit_codes::GENERAL_ERROR,
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
