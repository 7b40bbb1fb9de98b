//! inspector — process-lifetime owner of the store handle.
//!
//! Порядок жизненного цикла:
//! 1) (опционально) snapshot: hard-link копия каталога без LOCK;
//! 2) открытие движка (один handle на процесс) на snapshot или на исходном пути;
//! 3) обслуживание запросов через `&self` (общий `Arc<Inspector>` между воркерами);
//! 4) shutdown: сначала закрываем handle, затем удаляем snapshot.
//!
//! With a `ShutdownGate` the snapshot path is tracked from provisioning until
//! shutdown, so an interrupt at any point still removes it.
//!
//! Field order matters for Drop too: `store` is declared before `snapshot`,
//! so an inspector dropped without `shutdown` still closes before removing.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::browse::{browse, Page, PageRequest};
use crate::config::InspectConfig;
use crate::error::InspectResult;
use crate::metrics::record_value_lookup;
use crate::shutdown::ShutdownGate;
use crate::snapshot::{provision, SnapshotDir};
use crate::stats::{collect, StoreStats};
use crate::store::{OrderedStore, RocksStore};

pub struct Inspector {
    store: Box<dyn OrderedStore>,
    snapshot: Option<SnapshotDir>,
    source_path: PathBuf,
    gate: Option<ShutdownGate>,
}

impl Inspector {
    /// Open the store at `path` as configured (snapshot and read-only flags).
    pub fn open(path: &Path, cfg: &InspectConfig) -> InspectResult<Self> {
        Self::open_inner(path, cfg, None)
    }

    /// Like `open`, but the snapshot dir is registered in `gate` for the whole
    /// lifetime of the inspector.
    pub fn open_guarded(
        path: &Path,
        cfg: &InspectConfig,
        gate: &ShutdownGate,
    ) -> InspectResult<Self> {
        Self::open_inner(path, cfg, Some(gate))
    }

    fn open_inner(
        path: &Path,
        cfg: &InspectConfig,
        gate: Option<&ShutdownGate>,
    ) -> InspectResult<Self> {
        let snapshot = if cfg.snapshot {
            let snap = provision(path, &cfg.snapshot_parent(), &cfg.lock_file)?;
            if let Some(g) = gate {
                g.track_snapshot(snap.path());
            }
            Some(snap)
        } else {
            None
        };
        let open_path = snapshot
            .as_ref()
            .map(|s| s.path().to_path_buf())
            .unwrap_or_else(|| path.to_path_buf());

        let store = match RocksStore::open(&open_path, cfg.read_only) {
            Ok(s) => s,
            Err(e) => {
                // сначала удаляем каталог, потом снимаем с учёта
                drop(snapshot);
                if let Some(g) = gate {
                    g.untrack_snapshot();
                }
                return Err(e);
            }
        };

        Ok(Self {
            store: Box::new(store),
            snapshot,
            source_path: path.to_path_buf(),
            gate: gate.cloned(),
        })
    }

    /// Wrap an already opened store (no snapshot).
    pub fn with_store(store: Box<dyn OrderedStore>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            snapshot: None,
            source_path: source_path.into(),
            gate: None,
        }
    }

    /// The directory the operator pointed at (stats are computed here).
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_ref().map(|s| s.path())
    }

    pub fn browse(&self, req: &PageRequest) -> InspectResult<Page> {
        browse(self.store.as_ref(), req)
    }

    /// Point lookup; `Ok(None)` when the key is absent.
    pub fn value(&self, key: &[u8]) -> InspectResult<Option<Vec<u8>>> {
        let v = self.store.get(key)?;
        record_value_lookup(v.is_some());
        Ok(v)
    }

    pub fn stats(&self) -> StoreStats {
        collect(self.store.as_ref(), &self.source_path)
    }

    /// Close the handle, then remove the snapshot directory (if any).
    pub fn shutdown(self) {
        let Inspector {
            store,
            snapshot,
            source_path,
            gate,
        } = self;
        drop(store);
        info!("store {} closed", source_path.display());

        if let Some(snap) = snapshot {
            let p = snap.path().to_path_buf();
            match snap.remove() {
                Ok(()) => info!("snapshot {} removed", p.display()),
                Err(e) => warn!("snapshot {} not removed: {}", p.display(), e),
            }
        }
        if let Some(g) = gate {
            g.untrack_snapshot();
        }
    }
}
