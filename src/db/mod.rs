//! Store Module
//!
//! Provides the generic in-memory store with TTL expiration and atomic persistence.

mod entry;
pub mod format;
mod path;
mod persist;
mod stats;
mod store;


// Re-export public types
pub use entry::Entry;
pub use format::{Persisted, FORMAT_VERSION};
pub use persist::{TEMP_PREFIX, TEMP_SUFFIX};
pub use stats::StoreStats;
pub use store::Store;
