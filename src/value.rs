//! Cache values and the storable codec
//!
//! `CacheValue` is the value type at the cache interface boundary: a tagged
//! union of the kinds the store represents natively (integers, strings,
//! ordered lists, maps) plus `Blob`, the opaque fallback for everything else.
//! Arbitrary serde-serializable objects enter and leave the `Blob` arm
//! through `from_object`/`to_object`, which run the generic object codec
//! (serde_json).
//!
//! `encode`/`decode` translate between `CacheValue` and the store-side
//! `StoreValue`: native kinds pass through unchanged, `Blob` maps to the
//! store's byte-sequence kind. A byte-sequence coming back from the store
//! therefore always means the fallback path was used on the way in, so
//! `decode(encode(v)) == v` for every value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::client::StoreValue;
use crate::errors::CacheError;

/// Value at the cache interface boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CacheValue {
    Int(i64),
    Str(String),
    List(Vec<CacheValue>),
    Map(BTreeMap<String, CacheValue>),
    /// Serialized form of a value the store cannot represent natively
    Blob(Vec<u8>),
}

impl CacheValue {
    /// Serialize an arbitrary object into the opaque fallback form
    pub fn from_object<T: Serialize>(value: &T) -> Result<Self, CacheError> {
        Ok(CacheValue::Blob(serde_json::to_vec(value)?))
    }

    /// Deserialize an object previously stored through [`from_object`](Self::from_object)
    pub fn to_object<T: DeserializeOwned>(&self) -> Result<T, CacheError> {
        match self {
            CacheValue::Blob(bytes) => Ok(serde_json::from_slice(bytes)?),
            other => Err(CacheError::NotOpaque(format!("{other:?}"))),
        }
    }
}

impl From<i64> for CacheValue {
    fn from(value: i64) -> Self {
        CacheValue::Int(value)
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        CacheValue::Str(value.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        CacheValue::Str(value)
    }
}

/// Encode a cache value into its storable form
pub fn encode(value: CacheValue) -> StoreValue {
    match value {
        CacheValue::Int(n) => StoreValue::Int(n),
        CacheValue::Str(s) => StoreValue::Str(s),
        CacheValue::List(items) => StoreValue::List(items.into_iter().map(encode).collect()),
        CacheValue::Map(entries) => {
            StoreValue::Map(entries.into_iter().map(|(k, v)| (k, encode(v))).collect())
        }
        CacheValue::Blob(bytes) => StoreValue::Bytes(bytes),
    }
}

/// Decode a stored value back to the interface boundary form
pub fn decode(value: StoreValue) -> CacheValue {
    match value {
        StoreValue::Int(n) => CacheValue::Int(n),
        StoreValue::Str(s) => CacheValue::Str(s),
        StoreValue::List(items) => CacheValue::List(items.into_iter().map(decode).collect()),
        StoreValue::Map(entries) => {
            CacheValue::Map(entries.into_iter().map(|(k, v)| (k, decode(v))).collect())
        }
        StoreValue::Bytes(bytes) => CacheValue::Blob(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_values() -> Vec<CacheValue> {
        vec![
            CacheValue::Int(0),
            CacheValue::Int(-42),
            CacheValue::Str("hello".to_string()),
            CacheValue::Str(String::new()),
            CacheValue::List(vec![
                CacheValue::Int(1),
                CacheValue::Str("two".to_string()),
                CacheValue::List(vec![CacheValue::Int(3)]),
            ]),
            CacheValue::Map(BTreeMap::from([
                ("a".to_string(), CacheValue::Int(1)),
                (
                    "b".to_string(),
                    CacheValue::List(vec![CacheValue::Str("x".to_string())]),
                ),
            ])),
            CacheValue::Blob(vec![0, 1, 2, 255]),
        ]
    }

    #[test]
    fn codec_round_trip() {
        for value in sample_values() {
            assert_eq!(decode(encode(value.clone())), value);
        }
    }

    #[test]
    fn round_trip_survives_a_serialization_cycle_of_the_value() {
        for value in sample_values() {
            let json = serde_json::to_string(&value).unwrap();
            let restored: CacheValue = serde_json::from_str(&json).unwrap();
            assert_eq!(decode(encode(restored)), value);
        }
    }

    #[test]
    fn native_kinds_pass_through_unchanged() {
        assert_eq!(encode(CacheValue::Int(7)), StoreValue::Int(7));
        assert_eq!(
            encode(CacheValue::Str("s".to_string())),
            StoreValue::Str("s".to_string())
        );
        assert_eq!(
            encode(CacheValue::Blob(vec![1, 2])),
            StoreValue::Bytes(vec![1, 2])
        );
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Session {
        user_id: u64,
        roles: Vec<String>,
    }

    #[test]
    fn arbitrary_objects_round_trip_through_the_blob_arm() {
        let session = Session {
            user_id: 7,
            roles: vec!["admin".to_string(), "ops".to_string()],
        };

        let value = CacheValue::from_object(&session).unwrap();
        assert!(matches!(value, CacheValue::Blob(_)));

        let stored = encode(value);
        assert!(matches!(stored, StoreValue::Bytes(_)));

        let restored: Session = decode(stored).to_object().unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn to_object_rejects_native_values() {
        let result: Result<Session, _> = CacheValue::Int(1).to_object();
        assert!(result.is_err());
    }
}
