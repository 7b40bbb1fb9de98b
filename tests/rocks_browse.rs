// tests/rocks_browse.rs
//
// Листинг/поиск/значения поверх настоящего RocksDB, открытого read-only.
//
// Запуск:
//   cargo test --test rocks_browse -- --nocapture

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;

use KeyScope::{InspectConfig, InspectError, Inspector, OrderedStore, PageRequest, RocksStore, SearchMode};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let base = std::env::temp_dir();
    base.join(format!("kstest-rocks-{prefix}-{pid}-{t}-{id}"))
}

fn fruits(root: &Path) -> Result<()> {
    let db = rocksdb::DB::open_default(root)?;
    for (k, v) in [
        ("apple", "red"),
        ("applet", "tiny"),
        ("banana", "yellow"),
        ("grape", "green"),
    ] {
        db.put(k, v)?;
    }
    db.put([0x00u8, 0x01], [0xffu8, 0xfe])?;
    db.flush()?;
    Ok(())
}

#[test]
fn prefix_and_substring_pages() -> Result<()> {
    let root = unique_root("pages");
    fs::create_dir_all(&root)?;
    fruits(&root)?;

    let store = RocksStore::open(&root, true)?;
    let insp = Inspector::with_store(Box::new(store), &root);

    let page = insp.browse(&PageRequest::new("app", SearchMode::Prefix, 0, 0))?;
    assert_eq!(page.keys, vec![b"apple".to_vec(), b"applet".to_vec()]);
    assert_eq!(page.total, Some(2));

    let page = insp.browse(&PageRequest::new("a", SearchMode::Substring, 2, 1))?;
    assert_eq!(page.keys, vec![b"applet".to_vec(), b"banana".to_vec()]);
    assert_eq!(page.total, Some(4));

    // пустой префикс: весь диапазон, бинарный ключ первым (байтовый порядок)
    let page = insp.browse(&PageRequest::new("", SearchMode::Prefix, 0, 0))?;
    assert_eq!(page.total, Some(5));
    assert_eq!(page.keys[0], vec![0x00, 0x01]);

    insp.shutdown();
    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn values_and_not_found() -> Result<()> {
    let root = unique_root("values");
    fs::create_dir_all(&root)?;
    fruits(&root)?;

    let store = RocksStore::open(&root, true)?;
    assert_eq!(store.get(b"banana")?, Some(b"yellow".to_vec()));
    assert_eq!(store.get(&[0x00, 0x01])?, Some(vec![0xff, 0xfe]));
    assert_eq!(store.get(b"cherry")?, None);
    store.close();

    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn inspector_open_and_stats() -> Result<()> {
    let root = unique_root("stats");
    fs::create_dir_all(&root)?;
    fruits(&root)?;

    let insp = Inspector::open(&root, &InspectConfig::default())?;
    assert!(insp.snapshot_path().is_none());

    let s = insp.stats();
    assert_eq!(s.total_keys, Some(5));
    let size = s.db_size_bytes.expect("size of an existing dir");
    assert!(size > 0);
    assert!(s.warnings.is_empty(), "{:?}", s.warnings);

    insp.shutdown();
    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn open_missing_store_is_open_failed() -> Result<()> {
    let root = unique_root("missing");
    // не создаём: create_if_missing(false)
    let err = RocksStore::open(&root, true).err().expect("must fail");
    assert!(matches!(err, InspectError::OpenFailed { .. }));
    assert!(!root.exists(), "open must never create a store");
    Ok(())
}
