//! Credential storage and account sessions
//!
//! * [`location`]: where credentials come from
//! * [`registry`]: the accounts stored in an auth file
//! * [`config`]: a resolved credential source plus the account to act as
//! * [`session`]: valid access tokens, refreshed on demand
//! * [`manager`]: the `impt auth` operations

pub mod config;
pub mod location;
pub mod login;
pub mod manager;
pub mod registry;
pub mod session;

pub use config::{AuthConfig, EnvCredentials};
pub use location::{AuthEnv, AuthLocation, AuthPaths};
pub use login::{authenticate, LoginCredentials};
pub use manager::{AuthInfo, AuthManager, InfoReport, LoginOptions, LoginOutcome};
pub use registry::{AccountEntry, AccountGroup, AccountRecord, AccountRegistry, PendingSession};
pub use session::{Session, SessionManager, TokenStatus};
