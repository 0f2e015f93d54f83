//! Common utilities shared by the store crates.
//!
//! This crate provides:
//! - Unified error handling for store operations
//! - Configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{ErrorKind, OptionExt, StoreError, StoreResult};
