//! In-process store client used by the integration tests
//!
//! Implements `StoreClient` over a plain map so the backend's translation
//! layer can be exercised without a running store. Writes are additionally
//! journaled so tests can assert on the exact keys, bins and metadata the
//! backend sends downstream.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use aerocache::prelude::*;

#[derive(Default)]
pub struct MemoryClient {
    records: Mutex<HashMap<StoreKey, (RecordMeta, Bins)>>,
    /// When set, `increment` fails with a server error to force the
    /// backend's read-modify-write fallback
    pub fail_increment: AtomicBool,
    /// When set, `get`/`exists`/`get_many` fail with a server error
    pub fail_reads: AtomicBool,
    /// Credentials the backend connected with, once `connect` has run
    pub connected_with: Mutex<Option<Option<Credentials>>>,
    /// Journal of every `put`, in call order
    pub puts: Mutex<Vec<(StoreKey, Bins, RecordMeta)>>,
}

impl MemoryClient {
    pub fn fail_increments(&self) {
        self.fail_increment.store(true, Ordering::SeqCst);
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(StoreError::Server("read failed".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StoreClient for MemoryClient {
    async fn connect(&self, credentials: Option<&Credentials>) -> Result<(), StoreError> {
        *self.connected_with.lock().unwrap() = Some(credentials.cloned());
        Ok(())
    }

    async fn put(
        &self,
        key: &StoreKey,
        bins: &Bins,
        meta: &RecordMeta,
        _policy: &StorePolicy,
    ) -> Result<PutStatus, StoreError> {
        self.puts
            .lock()
            .unwrap()
            .push((key.clone(), bins.clone(), *meta));
        self.records
            .lock()
            .unwrap()
            .insert(key.clone(), (*meta, bins.clone()));
        Ok(PutStatus::Ok)
    }

    async fn get(
        &self,
        key: &StoreKey,
        _policy: &StorePolicy,
    ) -> Result<Option<StoreRecord>, StoreError> {
        self.check_reads()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(key)
            .map(|(meta, bins)| StoreRecord {
                key: key.clone(),
                meta: *meta,
                bins: bins.clone(),
            }))
    }

    async fn remove(&self, key: &StoreKey) -> Result<bool, StoreError> {
        Ok(self.records.lock().unwrap().remove(key).is_some())
    }

    async fn exists(
        &self,
        key: &StoreKey,
        _policy: &StorePolicy,
    ) -> Result<Option<RecordMeta>, StoreError> {
        self.check_reads()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(key)
            .map(|(meta, _)| *meta))
    }

    async fn increment(&self, key: &StoreKey, bin: &str, delta: i64) -> Result<i64, StoreError> {
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(StoreError::Server("increment not supported".to_string()));
        }

        let mut records = self.records.lock().unwrap();
        let Some((_, bins)) = records.get_mut(key) else {
            return Err(StoreError::Server("record not found".to_string()));
        };
        match bins.get_mut(bin) {
            Some(StoreValue::Int(n)) => {
                *n += delta;
                Ok(*n)
            }
            Some(_) => Err(StoreError::Server("bin is not an integer".to_string())),
            None => {
                bins.insert(bin.to_string(), StoreValue::Int(delta));
                Ok(delta)
            }
        }
    }

    async fn get_many(
        &self,
        keys: &[StoreKey],
        _policy: &StorePolicy,
    ) -> Result<Vec<Option<StoreRecord>>, StoreError> {
        self.check_reads()?;
        let records = self.records.lock().unwrap();
        Ok(keys
            .iter()
            .map(|key| {
                records.get(key).map(|(meta, bins)| StoreRecord {
                    key: key.clone(),
                    meta: *meta,
                    bins: bins.clone(),
                })
            })
            .collect())
    }

    async fn scan(&self, namespace: &str, set_name: &str) -> Result<Vec<StoreKey>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .keys()
            .filter(|key| key.namespace == namespace && key.set_name == set_name)
            .cloned()
            .collect())
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
