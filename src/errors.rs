//! Error types for cache operations
//!
//! This module defines all error types that can occur
//! during cache operations and store interactions.

use thiserror::Error;

use crate::client::StoreError;
use crate::config::ConfigError;

/// Cache backend errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("store connection error: {0}")]
    Connection(String),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("object codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("value is not an opaque blob: {0}")]
    NotOpaque(String),

    #[error("value for key '{0}' is not an integer")]
    NonNumeric(String),

    #[error("increment overflows the value stored under key '{0}'")]
    Overflow(String),

    #[error("cache backend is closed")]
    Closed,
}
