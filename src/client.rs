//! Store client interface
//!
//! This module defines the async seam between the cache backend and the
//! external record store's client library: the record/metadata/policy model
//! and the `StoreClient` trait the backend translates cache operations onto.
//! The crate does not implement a client itself; connection management,
//! clustering and scan cursors all live behind this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::config::Credentials;
use crate::key::StoreKey;

/// Value kinds the store represents natively, plus raw byte sequences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreValue {
    Int(i64),
    Str(String),
    List(Vec<StoreValue>),
    Map(BTreeMap<String, StoreValue>),
    Bytes(Vec<u8>),
}

/// Named fields of a single record
pub type Bins = HashMap<String, StoreValue>;

/// Per-record metadata attached to every write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordMeta {
    /// Time-to-live in store time units
    pub ttl: u32,
}

/// How the store retains the record's key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Keep only the key digest
    Digest,
    /// Keep the full key alongside the record, so keys can be enumerated
    /// during a scan
    #[default]
    SendKey,
}

/// Per-operation directives passed to the store
#[derive(Debug, Clone, Copy, Default)]
pub struct StorePolicy {
    pub key: KeyPolicy,
}

/// Outcome the store reports for a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutStatus {
    Ok,
    /// Store-side status code for a rejected write
    Failed(i32),
}

/// A record fetched from the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRecord {
    pub key: StoreKey,
    pub meta: RecordMeta,
    pub bins: Bins,
}

/// Errors surfaced by a store client
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store server error: {0}")]
    Server(String),

    #[error("store operation timed out")]
    Timeout,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Client for a record-oriented key-value store.
///
/// Implementations are expected to be safe for concurrent independent
/// operations on a shared connection; the cache backend adds no locking of
/// its own. A record that does not exist is reported as `None`, never as an
/// error.
#[async_trait]
pub trait StoreClient: Send + Sync + 'static {
    /// Establish the connection, authenticating when credentials are given
    async fn connect(&self, credentials: Option<&Credentials>) -> Result<(), StoreError>;

    /// Write a record with its metadata, returning the store's status
    async fn put(
        &self,
        key: &StoreKey,
        bins: &Bins,
        meta: &RecordMeta,
        policy: &StorePolicy,
    ) -> Result<PutStatus, StoreError>;

    /// Fetch a record, or `None` if it does not exist
    async fn get(&self, key: &StoreKey, policy: &StorePolicy)
    -> Result<Option<StoreRecord>, StoreError>;

    /// Remove a record, returning whether one existed
    async fn remove(&self, key: &StoreKey) -> Result<bool, StoreError>;

    /// Fetch only a record's metadata, or `None` if it does not exist
    async fn exists(
        &self,
        key: &StoreKey,
        policy: &StorePolicy,
    ) -> Result<Option<RecordMeta>, StoreError>;

    /// Atomically add `delta` to an integer bin, returning the new value
    async fn increment(&self, key: &StoreKey, bin: &str, delta: i64) -> Result<i64, StoreError>;

    /// Batch-fetch records, positionally aligned with `keys`
    async fn get_many(
        &self,
        keys: &[StoreKey],
        policy: &StorePolicy,
    ) -> Result<Vec<Option<StoreRecord>>, StoreError>;

    /// Enumerate the keys of every record in a namespace/set
    async fn scan(&self, namespace: &str, set_name: &str) -> Result<Vec<StoreKey>, StoreError>;

    /// Release the connection
    async fn close(&self) -> Result<(), StoreError>;
}
