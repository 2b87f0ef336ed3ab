//! # impt CLI
//!
//! Command-line client for impCentral device management.
//!
//! The interesting part is local state: credentials for several accounts
//! stored in global or per-project auth files, a resolver deciding which
//! credential source a command uses, access tokens refreshed on demand, and
//! the device groups a project directory is bound to.
//!
//! ## Architecture
//!
//! - Clap-based argument parsing with derive macros
//! - Handler-based command processing over [`auth::AuthManager`] and
//!   [`project::ProjectManager`]
//! - Collaborators behind traits ([`client::ApiConnector`],
//!   [`interactive::Prompter`]) gathered in a [`context::Context`]

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod interactive;
pub mod output;
pub mod progress;
pub mod project;
pub mod storage;

pub use cli::*;
pub use error::*;
