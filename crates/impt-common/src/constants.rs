//! Names and defaults shared by the impt crates
//!
//! These are compiled into the binary. File names and environment variables
//! are part of the tool's external interface and must stay stable.

/// Executable name, also used to derive config file names
pub const TOOL_NAME: &str = "impt";

/// Auth config file name (`.impt.auth`), looked up locally, globally and under
/// `IMPT_AUTH_FILE_PATH`
pub const AUTH_CONFIG_FILE_NAME: &str = ".impt.auth";

/// Project config file name, always in the working directory
pub const PROJECT_CONFIG_FILE_NAME: &str = ".impt.project";

/// Builder secrets kept next to the project file, never committed
pub const PROJECT_SECRETS_FILE_NAME: &str = ".impt.project.secrets";

/// Directory containing an auth file to use instead of the local/global ones
pub const ENV_VAR_AUTH_FILE_PATH: &str = "IMPT_AUTH_FILE_PATH";

/// Login key for environment-variable authentication
pub const ENV_VAR_LOGINKEY: &str = "IMPT_LOGINKEY";

/// Username or email for environment-variable authentication
pub const ENV_VAR_USER: &str = "IMPT_USER";

/// Password paired with `IMPT_USER`
pub const ENV_VAR_PASSWORD: &str = "IMPT_PASSWORD";

/// Endpoint override for environment-variable authentication
pub const ENV_VAR_ENDPOINT: &str = "IMPT_ENDPOINT";

/// Prefix for tool settings overrides (`IMPT_CLI_API__ENDPOINT=...`)
pub const ENV_SETTINGS_PREFIX: &str = "IMPT_CLI_";

/// Platform API endpoint used when neither the auth file nor the settings name one
pub const DEFAULT_ENDPOINT: &str = "https://api.electricimp.com/v5";

/// Default timeout in seconds for API requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
