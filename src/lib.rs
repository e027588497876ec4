//! Cache DB - A generic in-process key-value store
//!
//! Provides a thread-safe map with per-key TTL expiration and crash-safe
//! snapshot persistence.
//!
//! ```no_run
//! use std::time::Duration;
//! use cache_db::Store;
//!
//! let store: Store<String, String> = Store::new(Duration::from_secs(2), "./data");
//! store.set("foo".to_string(), "bar".to_string());
//! store.persist("t.db")?;
//!
//! let restored: Store<String, String> = Store::new(Duration::ZERO, "./data");
//! restored.load("t.db")?;
//! assert_eq!(restored.get(&"foo".to_string()), Some("bar".to_string()));
//! # Ok::<(), cache_db::StoreError>(())
//! ```

pub mod config;
pub mod db;
pub mod error;

pub use config::StoreConfig;
pub use db::{Entry, Store, StoreStats};
pub use error::{Result, StoreError};
