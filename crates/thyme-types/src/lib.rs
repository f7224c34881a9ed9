//! Foundation types for thyme.
//!
//! Shared by every thyme crate: the error enum with its `Result` alias and
//! the TOML configuration model.

pub mod config;
pub mod error;
