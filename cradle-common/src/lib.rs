//! # Cradle Common Library
//!
//! Shared code for Cradle admin services including:
//! - Error types
//! - Configuration loading (TOML file + environment)
//! - Settings table helpers (key/value persistence)

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
