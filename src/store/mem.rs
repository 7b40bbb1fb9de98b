//! store/mem — in-memory `OrderedStore` over a BTreeMap.
//!
//! Used by unit/integration tests and for embedding KeyScope over data that
//! is already in memory. `with_scan_fault_after(n)` makes every scan fail
//! after `n` keys were visited, which simulates an I/O fault mid-iteration.

use std::collections::BTreeMap;
use std::ops::{Bound, ControlFlow};

use crate::error::{InspectError, InspectResult};

use super::OrderedStore;

#[derive(Debug, Default, Clone)]
pub struct MemStore {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
    scan_fault_after: Option<usize>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
        I: IntoIterator<Item = (K, V)>,
    {
        let map = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_vec(), v.as_ref().to_vec()))
            .collect();
        Self {
            map,
            scan_fault_after: None,
        }
    }

    pub fn insert(&mut self, key: &[u8], value: &[u8]) {
        self.map.insert(key.to_vec(), value.to_vec());
    }

    pub fn with_scan_fault_after(mut self, n: usize) -> Self {
        self.scan_fault_after = Some(n);
        self
    }
}

impl OrderedStore for MemStore {
    fn scan_from(
        &self,
        lower: &[u8],
        visit: &mut dyn FnMut(&[u8]) -> ControlFlow<()>,
    ) -> InspectResult<()> {
        let range = self
            .map
            .range::<[u8], _>((Bound::Included(lower), Bound::Unbounded));
        for (visited, (k, _)) in range.enumerate() {
            if self.scan_fault_after == Some(visited) {
                return Err(InspectError::Scan(format!(
                    "injected fault after {} keys",
                    visited
                )));
            }
            if visit(k).is_break() {
                break;
            }
        }
        Ok(())
    }

    fn get(&self, key: &[u8]) -> InspectResult<Option<Vec<u8>>> {
        Ok(self.map.get(key).cloned())
    }

    fn estimated_keys(&self) -> Option<u64> {
        Some(self.map.len() as u64)
    }
}
