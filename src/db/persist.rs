//! Persistence Module
//!
//! Crash-safe snapshot and restore of the full store state.
//!
//! Snapshots are written to a temporary file in the target directory, synced,
//! then renamed over the target. The rename is the only commit point, so the
//! target is always either the previous snapshot or the complete new one.

use std::fs::{self, File};
use std::hash::Hash;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::db::format::{self, Persisted};
use crate::db::{path, Store};
use crate::error::{Result, StoreError};

/// Prefix of in-flight snapshot files
pub const TEMP_PREFIX: &str = ".cache-db-";

/// Suffix of in-flight snapshot files
pub const TEMP_SUFFIX: &str = ".tmp";

impl<K, V> Store<K, V>
where
    K: Eq + Hash + Clone + Serialize + DeserializeOwned,
    V: Clone + Serialize + DeserializeOwned,
{
    // == Persist ==
    /// Atomically writes the store to `filename` under the base directory.
    ///
    /// The entries are copied under the shared lock; encoding and every
    /// filesystem call happen after it is released. On failure the temporary
    /// file is removed and any existing target is left untouched.
    pub fn persist(&self, filename: impl AsRef<Path>) -> Result<()> {
        let path = self.resolve(filename.as_ref())?;

        let snapshot = {
            let state = self.state.read();
            Persisted::new(state.default_ttl, state.entries.clone())
        };

        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        // Dropping `tmp` on any early return deletes the temporary file.
        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&dir)
            .map_err(|e| StoreError::io(&dir, e))?;
        let temp_path = tmp.path().to_path_buf();
        debug!(temp = %temp_path.display(), "Writing snapshot");

        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            format::encode(&mut writer, &snapshot)?;
            writer.flush().map_err(|e| StoreError::io(&temp_path, e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(&temp_path, e))?;

        tmp.persist(&path)
            .map_err(|e| StoreError::io(&path, e.error))?;

        info!(
            path = %path.display(),
            entries = snapshot.data.len(),
            "Store persisted"
        );
        Ok(())
    }

    // == Load ==
    /// Replaces the in-memory state with the snapshot in `filename`.
    ///
    /// The file is fully decoded before the exclusive lock is taken; on any
    /// error the current state is left as it was. Entries keep their recorded
    /// expiration instants, so entries that expired on disk read as missing.
    pub fn load(&self, filename: impl AsRef<Path>) -> Result<()> {
        let path = self.resolve(filename.as_ref())?;

        let file = File::open(&path).map_err(|e| StoreError::io(&path, e))?;
        let len = file
            .metadata()
            .map_err(|e| StoreError::io(&path, e))?
            .len();
        let mut reader = BufReader::new(file);
        let record: Persisted<K, V> = format::decode(&mut reader, len)?;

        let entries = record.data.len();
        {
            let mut state = self.state.write();
            state.entries = record.data;
            state.default_ttl = record.default_ttl;
        }

        info!(path = %path.display(), entries, "Store loaded");
        Ok(())
    }
}

impl<K, V> Store<K, V> {
    // == Delete File ==
    /// Removes the snapshot `filename`. A missing file counts as success.
    pub fn delete_file(&self, filename: impl AsRef<Path>) -> Result<()> {
        let path = self.resolve(filename.as_ref())?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Snapshot deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    /// Resolves `filename` under the base directory.
    pub fn resolve(&self, filename: &Path) -> Result<PathBuf> {
        path::resolve(&self.base_path, filename)
    }
}
