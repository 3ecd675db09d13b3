//! Convenience re-exports for common aerocache usage

// Core backend components
pub use crate::backend::CacheBackend;
pub use crate::config::{
    CacheParams, CacheSettings, ConfigError, Credentials, ResolvedConfig, StoreOptions,
};
pub use crate::errors::CacheError;
pub use crate::key::StoreKey;
pub use crate::value::{CacheValue, decode, encode};

// Store client seam
pub use crate::client::{
    Bins, KeyPolicy, PutStatus, RecordMeta, StoreClient, StoreError, StorePolicy, StoreRecord,
    StoreValue,
};

// Common external dependencies
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use serde_json;
pub use tokio;
