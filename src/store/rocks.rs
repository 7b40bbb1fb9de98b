//! store/rocks — RocksDB-backed `OrderedStore`.
//!
//! Read-only open (`open_for_read_only`) takes no LOCK, so several inspectors
//! may read a store side by side. Read-write open acquires `<root>/LOCK` and
//! fails while another writer holds it; use a snapshot in that case.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rocksdb::{Options, DB};

use crate::error::{InspectError, InspectResult};

use super::OrderedStore;

pub struct RocksStore {
    db: DB,
    path: PathBuf,
}

impl RocksStore {
    /// Open the store at `path`. Never creates a store.
    pub fn open(path: &Path, read_only: bool) -> InspectResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(false);

        let res = if read_only {
            DB::open_for_read_only(&opts, path, false)
        } else {
            // RW-открытие требует перечислить все column families.
            DB::list_cf(&opts, path).and_then(|cfs| DB::open_cf(&opts, path, cfs))
        };
        let db = res.map_err(|e| InspectError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!(
            "opened store {} ({})",
            path.display(),
            if read_only { "read-only" } else { "read-write" }
        );
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    /// Release the handle. Call once, after every reader has returned.
    pub fn close(self) {
        debug!("closing store {}", self.path.display());
        drop(self.db);
    }
}

impl OrderedStore for RocksStore {
    fn scan_from(
        &self,
        lower: &[u8],
        visit: &mut dyn FnMut(&[u8]) -> ControlFlow<()>,
    ) -> InspectResult<()> {
        let mut it = self.db.raw_iterator();
        if lower.is_empty() {
            it.seek_to_first();
        } else {
            it.seek(lower);
        }
        while it.valid() {
            let Some(key) = it.key() else { break };
            if visit(key).is_break() {
                break;
            }
            it.next();
        }
        it.status().map_err(|e| InspectError::Scan(e.to_string()))
    }

    fn get(&self, key: &[u8]) -> InspectResult<Option<Vec<u8>>> {
        // Pinned slice lives only inside this call; copy out before returning.
        match self.db.get_pinned(key) {
            Ok(Some(slice)) => Ok(Some(slice.to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(InspectError::Lookup(e.to_string())),
        }
    }

    fn estimated_keys(&self) -> Option<u64> {
        self.db
            .property_int_value("rocksdb.estimate-num-keys")
            .ok()
            .flatten()
    }
}
