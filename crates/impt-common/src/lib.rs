//! Core shared pieces for the impt workspace
//!
//! Holds the file and environment variable names that the CLI and the SDK
//! both need to agree on, plus the logging bootstrap used by the binary.

pub mod constants;
pub mod logging;

pub use constants::*;
