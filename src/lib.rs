//! # aerocache
//!
//! A pluggable cache backend that maps a generic key-value cache interface
//! (get/set/add/delete/incr/clear/get_many/has_key) onto a record-oriented
//! key-value store. The backend handles key namespacing (namespace/set/bin),
//! TTL selection and serialization of non-primitive values; everything else
//! (connection management, clustering, scan cursors) lives behind the
//! [`StoreClient`](client::StoreClient) trait implemented by the store's
//! client library.
//!
//! ## Configuration
//!
//! ```
//! use aerocache::{CacheParams, CacheSettings};
//!
//! let settings = CacheSettings::new(
//!     "localhost:3000",
//!     CacheParams {
//!         namespace: Some("sessions".to_string()),
//!         timeout: Some(300),
//!         ..Default::default()
//!     },
//! );
//!
//! let config = settings.resolve().unwrap();
//! assert_eq!(config.namespace, "sessions");
//! assert_eq!(config.bin, "entry");
//! ```
//!
//! A backend is then built with `CacheBackend::connect(settings, client)`,
//! where `client` is any [`StoreClient`](client::StoreClient) implementation,
//! and released with `close()`.

pub mod backend;
pub mod client;
pub mod config;
pub mod errors;
pub mod key;
pub mod prelude;
pub mod value;

pub use backend::CacheBackend;
pub use client::{StoreClient, StoreError};
pub use config::{CacheParams, CacheSettings, ResolvedConfig, StoreOptions};
pub use errors::CacheError;
pub use key::StoreKey;
pub use value::CacheValue;
