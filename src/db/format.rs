//! On-disk snapshot format
//!
//! ```text
//! [Magic:8 | Version:u32 | DefaultTTL:Duration | Data:HashMap<K, Entry<V>>]
//! ```
//!
//! Every field after the magic is bincode-encoded. The version is decoded
//! before the body so that a future layout is never read as the current one.

use std::collections::HashMap;
use std::hash::Hash;
use std::io::{Read, Write};
use std::time::Duration;

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::Entry;
use crate::error::{Result, StoreError};

/// Snapshot file magic: "CACHEDB" followed by 0x01
pub const FORMAT_MAGIC: &[u8; 8] = b"CACHEDB\x01";

/// Snapshot format version
pub const FORMAT_VERSION: u32 = 1;

/// Fixed-width little-endian integers; `limit` caps the bytes any single
/// decode may claim, so a corrupt length prefix fails instead of allocating.
fn options(limit: u64) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(limit)
}

// == Persisted Record ==
/// Full store state as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persisted<K: Eq + Hash, V> {
    pub version: u32,
    pub default_ttl: Duration,
    pub data: HashMap<K, Entry<V>>,
}

impl<K: Eq + Hash, V> Persisted<K, V> {
    /// Wraps a snapshot in a record stamped with the current format version.
    pub fn new(default_ttl: Duration, data: HashMap<K, Entry<V>>) -> Self {
        Self {
            version: FORMAT_VERSION,
            default_ttl,
            data,
        }
    }
}

// == Encode ==
/// Writes the magic followed by the record.
pub fn encode<K, V, W>(writer: &mut W, record: &Persisted<K, V>) -> Result<()>
where
    K: Eq + Hash + Serialize,
    V: Serialize,
    W: Write,
{
    writer
        .write_all(FORMAT_MAGIC)
        .map_err(|e| StoreError::Encode(e.into()))?;
    options(u64::MAX)
        .serialize_into(writer, record)
        .map_err(StoreError::Encode)
}

// == Decode ==
/// Reads and validates a record written by [`encode`].
///
/// `limit` is the size of the input in bytes; no field may claim more.
pub fn decode<K, V, R>(reader: &mut R, limit: u64) -> Result<Persisted<K, V>>
where
    K: Eq + Hash + DeserializeOwned,
    V: DeserializeOwned,
    R: Read,
{
    let mut magic = [0u8; 8];
    reader.read_exact(&mut magic).map_err(|e| {
        StoreError::CorruptedFile(format!("cannot read snapshot header: {}", e))
    })?;
    if magic != *FORMAT_MAGIC {
        return Err(StoreError::CorruptedFile(format!(
            "invalid snapshot magic: expected {:?}, got {:?}",
            FORMAT_MAGIC, magic
        )));
    }

    let version: u32 = options(limit)
        .deserialize_from(&mut *reader)
        .map_err(StoreError::Decode)?;
    if version != FORMAT_VERSION {
        warn!(
            found = version,
            expected = FORMAT_VERSION,
            "Refusing snapshot with unsupported format version"
        );
        return Err(StoreError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let default_ttl: Duration = options(limit)
        .deserialize_from(&mut *reader)
        .map_err(StoreError::Decode)?;
    let data: HashMap<K, Entry<V>> = options(limit)
        .deserialize_from(&mut *reader)
        .map_err(StoreError::Decode)?;

    Ok(Persisted {
        version,
        default_ttl,
        data,
    })
}
