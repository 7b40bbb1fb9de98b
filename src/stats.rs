//! stats — aggregate numbers for a store.
//!
//! - total_key_count: full ascending scan (== count_by_prefix(""))
//! - directory_byte_size: recursive sum of regular-file sizes under the
//!   source store dir (never the snapshot); any traversal error aborts.
//! - collect: best-effort bundle; each failed part is logged, listed in
//!   `warnings` and left as `None` instead of a fake zero.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::browse::count_by_prefix;
use crate::error::{InspectError, InspectResult};
use crate::store::OrderedStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub total_keys: Option<u64>,
    pub estimated_keys: Option<u64>,
    pub db_path: PathBuf,
    pub db_size_bytes: Option<u64>,
    pub warnings: Vec<String>,
}

pub fn total_key_count(store: &dyn OrderedStore) -> InspectResult<u64> {
    count_by_prefix(store, b"")
}

pub fn directory_byte_size(path: &Path) -> InspectResult<u64> {
    let wrap = |p: &Path, e| InspectError::SizeComputation {
        path: p.to_path_buf(),
        source: e,
    };

    // Корень разыменовываем: --db часто симлинк на каталог стора.
    // Внутри каталога симлинки не считаются.
    let root = fs::metadata(path).map_err(|e| wrap(path, e))?;
    if root.is_file() {
        return Ok(root.len());
    }
    if !root.is_dir() {
        return Ok(0);
    }

    let mut size = 0u64;
    let mut stack = vec![path.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).map_err(|e| wrap(&dir, e))? {
            let entry = entry.map_err(|e| wrap(&dir, e))?;
            let ft = entry.file_type().map_err(|e| wrap(&entry.path(), e))?;
            if ft.is_dir() {
                stack.push(entry.path());
            } else if ft.is_file() {
                let m = entry.metadata().map_err(|e| wrap(&entry.path(), e))?;
                size += m.len();
            }
        }
    }
    Ok(size)
}

pub fn collect(store: &dyn OrderedStore, db_path: &Path) -> StoreStats {
    let mut warnings = Vec::new();

    let total_keys = match total_key_count(store) {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("count keys for stats: {}", e);
            warnings.push(format!("total_keys: {}", e));
            None
        }
    };

    let db_size_bytes = match directory_byte_size(db_path) {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("calculate db size: {}", e);
            warnings.push(format!("db_size_bytes: {}", e));
            None
        }
    };

    StoreStats {
        total_keys,
        estimated_keys: store.estimated_keys(),
        db_path: db_path.to_path_buf(),
        db_size_bytes,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_ID: AtomicU64 = AtomicU64::new(1);

    fn unique_root(prefix: &str) -> PathBuf {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "kstest-stats-{prefix}-{}-{id}",
            std::process::id()
        ))
    }

    #[test]
    fn sums_regular_files_recursively() {
        let root = unique_root("sum");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("A"), vec![0u8; 100]).unwrap();
        fs::write(root.join("B"), vec![0u8; 250]).unwrap();
        assert_eq!(directory_byte_size(&root).unwrap(), 350);

        fs::write(root.join("sub").join("C"), vec![0u8; 50]).unwrap();
        assert_eq!(directory_byte_size(&root).unwrap(), 400);

        let _ = fs::remove_dir_all(&root);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_root_is_followed() {
        let base = unique_root("link");
        let real = base.join("real");
        fs::create_dir_all(&real).unwrap();
        fs::write(real.join("A"), vec![0u8; 100]).unwrap();
        fs::write(real.join("B"), vec![0u8; 250]).unwrap();
        let link = base.join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        assert_eq!(directory_byte_size(&link).unwrap(), 350);

        // симлинк внутри стора не раздувает размер
        std::os::unix::fs::symlink(real.join("B"), real.join("B.alias")).unwrap();
        assert_eq!(directory_byte_size(&link).unwrap(), 350);

        let store = MemStore::from_pairs([("a", "1")]);
        let s = collect(&store, &link);
        assert_eq!(s.db_size_bytes, Some(350));
        assert!(s.warnings.is_empty());

        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn stats_example() {
        let root = unique_root("example");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("A"), vec![1u8; 100]).unwrap();
        fs::write(root.join("B"), vec![2u8; 250]).unwrap();
        let store = MemStore::from_pairs([("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")]);

        let s = collect(&store, &root);
        assert_eq!(s.total_keys, Some(4));
        assert_eq!(s.db_size_bytes, Some(350));
        assert_eq!(s.db_path, root);
        assert!(s.warnings.is_empty());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_dir_is_unknown_not_zero() {
        let root = unique_root("missing");
        assert!(matches!(
            directory_byte_size(&root),
            Err(InspectError::SizeComputation { .. })
        ));

        let store = MemStore::from_pairs([("k", "v")]);
        let s = collect(&store, &root);
        assert_eq!(s.total_keys, Some(1), "count still reported");
        assert_eq!(s.db_size_bytes, None);
        assert_eq!(s.warnings.len(), 1);
    }

    #[test]
    fn failed_count_is_unknown() {
        let root = unique_root("count");
        fs::create_dir_all(&root).unwrap();
        let store = MemStore::from_pairs([("a", ""), ("b", "")]).with_scan_fault_after(1);
        let s = collect(&store, &root);
        assert_eq!(s.total_keys, None);
        assert_eq!(s.db_size_bytes, Some(0));
        assert!(s.warnings[0].starts_with("total_keys"));
        let _ = fs::remove_dir_all(&root);
    }
}
