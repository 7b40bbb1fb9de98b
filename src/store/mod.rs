//! store — доступ к упорядоченному KV-движку.
//!
//! - mod.rs  — трейт `OrderedStore` (seek + ascending visit, point lookup)
//! - rocks.rs — RocksDB (read-only или read-write, один handle на процесс)
//! - mem.rs   — BTreeMap-реализация для тестов (с инъекцией сбоя скана)
//!
//! Keys compare as raw bytes, lexicographically; every implementation must
//! visit them in that order.

use std::ops::ControlFlow;

use crate::error::InspectResult;

pub mod mem;
pub mod rocks;

pub use mem::MemStore;
pub use rocks::RocksStore;

/// Read-only view of an ordered key-value engine.
///
/// Implementations are shared across request workers without extra locking,
/// so they must be safe for concurrent reads.
pub trait OrderedStore: Send + Sync {
    /// Visit keys in ascending order, starting at the first key >= `lower`.
    ///
    /// Iteration stops when `visit` returns `ControlFlow::Break`. An engine
    /// failure mid-way is reported as `InspectError::Scan`; keys already handed
    /// to `visit` must then be treated as garbage by the caller.
    fn scan_from(
        &self,
        lower: &[u8],
        visit: &mut dyn FnMut(&[u8]) -> ControlFlow<()>,
    ) -> InspectResult<()>;

    /// Point lookup. `Ok(None)` means the key is absent.
    ///
    /// The returned bytes are an owned copy, independent of engine buffers.
    fn get(&self, key: &[u8]) -> InspectResult<Option<Vec<u8>>>;

    /// Engine-side key estimate, if the engine keeps one.
    fn estimated_keys(&self) -> Option<u64> {
        None
    }
}
