//! Core types and shared functionality for coverscout.
//!
//! This crate provides:
//! - Unified error types
//! - Layered configuration
//! - Placeholder cover generation

pub mod config;
pub mod error;
pub mod placeholder;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use placeholder::placeholder_cover;
