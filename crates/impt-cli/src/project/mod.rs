//! Device groups bound to the working directory

pub mod config;
pub mod manager;

pub use config::{BuilderVariables, DeviceGroupBinding, ProjectConfig, ProjectFile, ProjectSecrets};
pub use manager::{BindingSummary, CreateOptions, ProjectInfo, ProjectManager, UpdateOptions};
