//! browse — key paging over the ordered key space.
//!
//! Два режима:
//! - prefix: seek к первому ключу >= prefix, идём пока ключ начинается с prefix;
//!   пропускаем offset совпадений, собираем limit, дальше не сканируем.
//!   Общее число совпадений — отдельный полный проход (`count_by_prefix`).
//! - substring: индекса нет, поэтому один полный проход по всем ключам;
//!   total и окно [offset, offset+limit) считаются в одном проходе. O(n) всегда.
//!
//! Keys come out in ascending raw-byte order, the engine's native order. There
//! is no secondary sort key.
//!
//! A scan error drops whatever was collected and surfaces `InspectError::Scan`.

use std::fmt;
use std::ops::ControlFlow;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_PAGE_LIMIT;
use crate::error::InspectResult;
use crate::metrics::{
    record_browse_prefix, record_browse_substring, record_keys_visited, record_scan_error,
};
use crate::store::OrderedStore;

pub type Key = Vec<u8>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Prefix,
    Substring,
}

impl SearchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::Prefix => "prefix",
            SearchMode::Substring => "substring",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    /// Empty string means the default (prefix).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "prefix" => Ok(SearchMode::Prefix),
            "substring" => Ok(SearchMode::Substring),
            other => Err(format!(
                "unknown mode '{}' (expected 'prefix' or 'substring')",
                other
            )),
        }
    }
}

/// Normalized browse request: `limit > 0`, `offset >= 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: Vec<u8>,
    pub mode: SearchMode,
    pub limit: usize,
    pub offset: usize,
}

impl PageRequest {
    /// Build a request from raw numbers: limit <= 0 becomes the default (50),
    /// a negative offset becomes 0.
    pub fn new(query: impl Into<Vec<u8>>, mode: SearchMode, limit: i64, offset: i64) -> Self {
        let limit = if limit <= 0 {
            DEFAULT_PAGE_LIMIT
        } else {
            usize::try_from(limit).unwrap_or(usize::MAX)
        };
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        Self {
            query: query.into(),
            mode,
            limit,
            offset,
        }
    }
}

/// One page of keys.
///
/// `total` is `None` only when the best-effort prefix count failed; the keys
/// themselves are still complete for the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub keys: Vec<Key>,
    pub total: Option<u64>,
    pub offset: usize,
    pub limit: usize,
    pub mode: SearchMode,
}

/// Counts keys handed to the visitor and reports them to metrics on drop,
/// so aborted scans are accounted for too.
struct VisitCounter(u64);

impl Drop for VisitCounter {
    fn drop(&mut self) {
        record_keys_visited(self.0);
    }
}

fn scan_error<T>(res: InspectResult<T>) -> InspectResult<T> {
    if res.is_err() {
        record_scan_error();
    }
    res
}

/// Keys starting with `prefix`, window `[offset, offset + limit)`.
pub fn list_by_prefix(
    store: &dyn OrderedStore,
    prefix: &[u8],
    limit: usize,
    offset: usize,
) -> InspectResult<Vec<Key>> {
    let mut keys = Vec::new();
    if limit == 0 {
        return Ok(keys);
    }
    let mut seen = 0usize;
    let mut visited = VisitCounter(0);
    scan_error(store.scan_from(prefix, &mut |k| {
        visited.0 += 1;
        if !k.starts_with(prefix) {
            return ControlFlow::Break(());
        }
        if seen >= offset {
            keys.push(k.to_vec());
            if keys.len() >= limit {
                return ControlFlow::Break(());
            }
        }
        seen += 1;
        ControlFlow::Continue(())
    }))?;
    Ok(keys)
}

/// Number of keys starting with `prefix`. Walks every match.
pub fn count_by_prefix(store: &dyn OrderedStore, prefix: &[u8]) -> InspectResult<u64> {
    let mut count = 0u64;
    let mut visited = VisitCounter(0);
    scan_error(store.scan_from(prefix, &mut |k| {
        visited.0 += 1;
        if !k.starts_with(prefix) {
            return ControlFlow::Break(());
        }
        count += 1;
        ControlFlow::Continue(())
    }))?;
    Ok(count)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

/// Keys containing `needle` anywhere, window `[offset, offset + limit)`, plus
/// the total number of matching keys. Always a full scan.
pub fn list_by_substring(
    store: &dyn OrderedStore,
    needle: &[u8],
    limit: usize,
    offset: usize,
) -> InspectResult<(Vec<Key>, u64)> {
    let mut keys = Vec::new();
    let mut total = 0u64;
    let mut visited = VisitCounter(0);
    scan_error(store.scan_from(b"", &mut |k| {
        visited.0 += 1;
        if contains(k, needle) {
            // total до инкремента == позиция совпадения
            let pos = total;
            total += 1;
            if pos >= offset as u64 && keys.len() < limit {
                keys.push(k.to_vec());
            }
        }
        ControlFlow::Continue(())
    }))?;
    Ok((keys, total))
}

/// Run a normalized request.
///
/// Prefix mode issues two passes (page, then count); a failing count is
/// logged and reported as `total: None`, a failing page is an error.
pub fn browse(store: &dyn OrderedStore, req: &PageRequest) -> InspectResult<Page> {
    let (keys, total) = match req.mode {
        SearchMode::Prefix => {
            record_browse_prefix();
            let keys = list_by_prefix(store, &req.query, req.limit, req.offset)?;
            let total = match count_by_prefix(store, &req.query) {
                Ok(n) => Some(n),
                Err(e) => {
                    warn!("count keys for prefix: {}", e);
                    None
                }
            };
            (keys, total)
        }
        SearchMode::Substring => {
            record_browse_substring();
            let (keys, total) = list_by_substring(store, &req.query, req.limit, req.offset)?;
            (keys, Some(total))
        }
    };
    Ok(Page {
        keys,
        total,
        offset: req.offset,
        limit: req.limit,
        mode: req.mode,
    })
}
