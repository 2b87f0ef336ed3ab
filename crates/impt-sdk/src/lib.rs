//! # impt SDK
//!
//! Minimal client for the impCentral REST API covering what the CLI's
//! credential layer needs: password / OTP / login-key authentication, token
//! refresh, and account and device group lookups.
//!
//! Callers depend on the [`ImpCentralApi`] trait; [`ImpCentralClient`] is the
//! reqwest-backed implementation.

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::ImpCentralApi;
pub use client::{ClientBuilder, ImpCentralClient};
pub use error::{ApiError, Result};
pub use types::{AccessToken, Account, DeviceGroup};
