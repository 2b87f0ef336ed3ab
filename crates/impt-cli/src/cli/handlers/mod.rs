//! Command handlers for the impt CLI

pub mod auth;
pub mod config;
pub mod project;
