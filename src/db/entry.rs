//! Store Entry Module
//!
//! Defines the structure for individual entries with TTL support.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Entry ==
/// A stored value together with its absolute expiration instant.
///
/// An entry whose `expires_at` is `None` never expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry<V> {
    /// The stored value
    pub value: V,
    /// Absolute expiration instant, None = no expiration
    pub expires_at: Option<DateTime<Utc>>,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` from now.
    ///
    /// A zero `ttl` produces an entry that never expires. A `ttl` too large
    /// to represent as a timestamp is treated the same way.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: expiration_from_now(ttl),
        }
    }

    /// Creates an entry that never expires.
    pub fn persistent(value: V) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// The expiration instant itself counts as expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Checks expiry against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| (expires - Utc::now()).to_std().unwrap_or(Duration::ZERO))
    }
}

// == Utility Functions ==
/// Computes `now + ttl`, or None when `ttl` is zero or overflows.
pub(crate) fn expiration_from_now(ttl: Duration) -> Option<DateTime<Utc>> {
    if ttl.is_zero() {
        return None;
    }
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
}
