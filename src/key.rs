//! Composite record keys
//!
//! A record in the store is addressed by a (namespace, set, user-key)
//! triple. The namespace and set come from the resolved configuration;
//! the user key is the caller's cache key, with an optional version tag
//! folded in so that different versions of the same logical key map to
//! distinct records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ResolvedConfig;

/// Composite key identifying a single record in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
    pub namespace: String,
    pub set_name: String,
    pub user_key: String,
}

impl StoreKey {
    /// Build the composite key for a caller-supplied cache key
    pub fn new(config: &ResolvedConfig, key: &str, version: Option<u64>) -> Self {
        let user_key = match version {
            Some(v) => format!("{v}:{key}"),
            None => key.to_string(),
        };
        Self {
            namespace: config.namespace.clone(),
            set_name: config.set_name.clone(),
            user_key,
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.set_name, self.user_key)
    }
}
