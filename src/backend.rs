//! Cache backend implementation
//!
//! This module provides the main `CacheBackend` struct, which translates
//! generic cache operations (get/set/add/delete/incr/clear/get_many/has_key)
//! into calls against a [`StoreClient`]. It holds no caching state of its
//! own: every operation forwards to the store, with key construction, TTL
//! selection and value encoding applied on the way through.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::client::{Bins, PutStatus, RecordMeta, StoreClient, StorePolicy};
use crate::config::{CacheSettings, ResolvedConfig};
use crate::errors::CacheError;
use crate::key::StoreKey;
use crate::value::{CacheValue, decode, encode};

/// Cache backend over a record-oriented key-value store.
///
/// The backend is constructed once with [`connect`](Self::connect), holds the
/// connection for its lifetime, and is explicitly released with
/// [`close`](Self::close). Clones share the same connection and closed state.
pub struct CacheBackend<C: StoreClient> {
    client: Arc<C>,
    config: Arc<ResolvedConfig>,
    settings: CacheSettings,
    policy: StorePolicy,
    closed: Arc<AtomicBool>,
}

impl<C: StoreClient> Clone for CacheBackend<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config: Arc::clone(&self.config),
            settings: self.settings.clone(),
            policy: self.policy,
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<C: StoreClient> Debug for CacheBackend<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.closed.load(Ordering::SeqCst) {
            "closed"
        } else {
            "connected"
        };

        f.debug_struct("CacheBackend")
            .field("config", &self.config)
            .field("state", &state)
            .finish()
    }
}

impl<C: StoreClient> CacheBackend<C> {
    /// Resolve the settings and establish the store connection.
    ///
    /// Connects without credentials when none are configured (community
    /// mode) and with both username and password otherwise; settings with
    /// exactly one of the two are rejected during resolution. Connection
    /// failures are fatal here and are not retried.
    pub async fn connect(settings: CacheSettings, client: C) -> Result<Self, CacheError> {
        let config = settings.resolve()?;

        client
            .connect(config.credentials.as_ref())
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        debug!(
            address = %config.address(),
            namespace = %config.namespace,
            set_name = %config.set_name,
            "connected to store"
        );

        Ok(Self {
            client: Arc::new(client),
            config: Arc::new(config),
            settings,
            policy: StorePolicy::default(),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The resolved, immutable configuration
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// The serializable settings snapshot this backend was built from,
    /// suitable for reconstructing an equivalent backend elsewhere
    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// The wrapped store client
    pub fn client(&self) -> &C {
        &self.client
    }

    fn ensure_open(&self) -> Result<(), CacheError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(CacheError::Closed)
        } else {
            Ok(())
        }
    }

    fn make_key(&self, key: &str, version: Option<u64>) -> StoreKey {
        StoreKey::new(&self.config, key, version)
    }

    /// Write a value under `key`.
    ///
    /// The record's TTL is the per-call `timeout` when given, the configured
    /// default otherwise. Returns `Ok(true)` when the store reports success,
    /// `Ok(false)` when it reports a non-success status; transport errors
    /// surface as `Err`.
    pub async fn set(
        &self,
        key: &str,
        value: CacheValue,
        timeout: Option<u32>,
        version: Option<u64>,
    ) -> Result<bool, CacheError> {
        self.ensure_open()?;
        let store_key = self.make_key(key, version);

        let mut bins = Bins::new();
        bins.insert(self.config.bin.clone(), encode(value));
        let meta = RecordMeta {
            ttl: timeout.unwrap_or(self.config.default_ttl),
        };

        match self.client.put(&store_key, &bins, &meta, &self.policy).await? {
            PutStatus::Ok => Ok(true),
            PutStatus::Failed(code) => {
                warn!(key = %store_key, code, "store rejected write");
                Ok(false)
            }
        }
    }

    /// Write a value under `key`; same contract as [`set`](Self::set)
    pub async fn add(
        &self,
        key: &str,
        value: CacheValue,
        timeout: Option<u32>,
        version: Option<u64>,
    ) -> Result<bool, CacheError> {
        self.set(key, value, timeout, version).await
    }

    /// Fetch the value stored under `key`, or `None` if there is no record
    /// (or the record has no cache bin). Store errors are logged and
    /// returned to the caller.
    pub async fn get(
        &self,
        key: &str,
        version: Option<u64>,
    ) -> Result<Option<CacheValue>, CacheError> {
        self.ensure_open()?;
        let store_key = self.make_key(key, version);

        let record = self
            .client
            .get(&store_key, &self.policy)
            .await
            .inspect_err(|e| warn!(key = %store_key, error = %e, "store read failed"))?;

        Ok(record
            .and_then(|mut r| r.bins.remove(&self.config.bin))
            .map(decode))
    }

    /// Fetch the value stored under `key`, degrading to `default` on a
    /// missing record or any error, including [`CacheError::Closed`] on a
    /// closed backend. Callers that need to observe errors use
    /// [`get`](Self::get).
    pub async fn get_or(
        &self,
        key: &str,
        default: CacheValue,
        version: Option<u64>,
    ) -> CacheValue {
        match self.get(key, version).await {
            Ok(Some(value)) => value,
            Ok(None) | Err(_) => default,
        }
    }

    /// Remove the record under `key`, failing silently: a missing record is
    /// a no-op and store errors are only logged
    pub async fn delete(&self, key: &str, version: Option<u64>) -> Result<(), CacheError> {
        self.ensure_open()?;
        let store_key = self.make_key(key, version);

        if let Err(e) = self.client.remove(&store_key).await {
            debug!(key = %store_key, error = %e, "delete failed silently");
        }
        Ok(())
    }

    /// Batch-fetch values for `keys`. Keys without a stored value are
    /// omitted from the result; an empty input returns an empty map without
    /// touching the store.
    pub async fn get_many(
        &self,
        keys: &[&str],
        version: Option<u64>,
    ) -> Result<HashMap<String, CacheValue>, CacheError> {
        self.ensure_open()?;
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let store_keys: Vec<StoreKey> = keys.iter().map(|k| self.make_key(k, version)).collect();
        let records = self
            .client
            .get_many(&store_keys, &self.policy)
            .await
            .inspect_err(|e| warn!(error = %e, "store batch read failed"))?;

        let mut values = HashMap::new();
        for (key, record) in keys.iter().zip(records) {
            let Some(mut record) = record else { continue };
            if let Some(value) = record.bins.remove(&self.config.bin) {
                values.insert((*key).to_string(), decode(value));
            }
        }
        Ok(values)
    }

    /// Whether a non-expired record exists under `key`
    pub async fn has_key(&self, key: &str, version: Option<u64>) -> Result<bool, CacheError> {
        self.ensure_open()?;
        let store_key = self.make_key(key, version);

        let meta = self
            .client
            .exists(&store_key, &self.policy)
            .await
            .inspect_err(|e| warn!(key = %store_key, error = %e, "store exists check failed"))?;

        Ok(meta.is_some())
    }

    /// Add `delta` to the integer stored under `key`, returning the new
    /// value. The key must already exist.
    ///
    /// Prefers the store's atomic increment. When that fails and
    /// `atomic_only` is not configured, falls back to read-modify-write,
    /// which is NOT atomic: concurrent increments of the same key can lose
    /// updates. With `atomic_only` set the store error propagates instead.
    pub async fn incr(
        &self,
        key: &str,
        delta: i64,
        version: Option<u64>,
    ) -> Result<i64, CacheError> {
        self.ensure_open()?;
        if !self.has_key(key, version).await? {
            return Err(CacheError::KeyNotFound(key.to_string()));
        }
        let store_key = self.make_key(key, version);

        match self.client.increment(&store_key, &self.config.bin, delta).await {
            Ok(value) => Ok(value),
            Err(e) if !self.config.atomic_only => {
                warn!(
                    key = %store_key,
                    error = %e,
                    "atomic increment failed, falling back to read-modify-write"
                );
                let current = match self.get(key, version).await? {
                    Some(CacheValue::Int(n)) => n,
                    Some(_) => return Err(CacheError::NonNumeric(key.to_string())),
                    None => return Err(CacheError::KeyNotFound(key.to_string())),
                };
                let next = current
                    .checked_add(delta)
                    .ok_or_else(|| CacheError::Overflow(key.to_string()))?;
                self.set(key, CacheValue::Int(next), None, version).await?;
                Ok(next)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove every record in the configured namespace/set.
    ///
    /// Scan-based and not transactional: records written concurrently may
    /// be missed, or re-appear after their removal.
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.ensure_open()?;

        let keys = self
            .client
            .scan(&self.config.namespace, &self.config.set_name)
            .await?;
        let count = keys.len();
        for key in keys {
            if let Err(e) = self.client.remove(&key).await {
                debug!(key = %key, error = %e, "remove during clear failed");
            }
        }
        debug!(
            count,
            namespace = %self.config.namespace,
            set_name = %self.config.set_name,
            "cleared cache set"
        );
        Ok(())
    }

    /// Release the store connection. Further operations on this backend
    /// (or any clone) return [`CacheError::Closed`]; closing twice is a
    /// no-op.
    pub async fn close(&self) -> Result<(), CacheError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.client.close().await?;
        debug!("store connection closed");
        Ok(())
    }
}
