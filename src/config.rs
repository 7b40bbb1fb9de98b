//! Centralized configuration for KeyScope.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - `InspectConfig::from_env()` reads `KS_*` variables; CLI flags override them
//!   through the fluent `with_*` setters.
//!
//! Defaults:
//! - read_only = true (never contend for the writer's lock unless asked)
//! - snapshot = false (hard-link snapshot is opt-in, same-device only)
//! - snapshot_dir = None (OS temp dir)
//! - lock_file = "LOCK"
//! - http_workers = 4

use std::fmt;
use std::path::{Path, PathBuf};

use crate::consts::{DEFAULT_HTTP_WORKERS, LOCK_FILE};

/// Top-level configuration for the inspector (store open mode, snapshot, HTTP pool).
#[derive(Clone, Debug)]
pub struct InspectConfig {
    /// Open the engine read-only.
    /// Env: KS_READ_ONLY (default true; "0|false|off|no" => false)
    pub read_only: bool,

    /// Provision a hard-link snapshot and open that instead of the source dir.
    /// Env: KS_SNAPSHOT (default false)
    pub snapshot: bool,

    /// Parent directory for snapshot dirs. Must be on the store's filesystem.
    /// Env: KS_SNAPSHOT_DIR (default: OS temp dir)
    pub snapshot_dir: Option<PathBuf>,

    /// Name of the engine's exclusive-lock file, excluded from snapshots.
    /// Env: KS_LOCK_FILE (default "LOCK")
    pub lock_file: String,

    /// Worker threads serving HTTP requests.
    /// Env: KS_HTTP_WORKERS (default 4, min 1)
    pub http_workers: usize,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            read_only: true,
            snapshot: false,
            snapshot_dir: None,
            lock_file: LOCK_FILE.to_string(),
            http_workers: DEFAULT_HTTP_WORKERS,
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

impl InspectConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("KS_READ_ONLY") {
            if let Some(on) = parse_bool(&v) {
                cfg.read_only = on;
            }
        }

        if let Ok(v) = std::env::var("KS_SNAPSHOT") {
            if let Some(on) = parse_bool(&v) {
                cfg.snapshot = on;
            }
        }

        if let Ok(v) = std::env::var("KS_SNAPSHOT_DIR") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.snapshot_dir = Some(PathBuf::from(s));
            }
        }

        if let Ok(v) = std::env::var("KS_LOCK_FILE") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.lock_file = s.to_string();
            }
        }

        if let Ok(v) = std::env::var("KS_HTTP_WORKERS") {
            if let Ok(n) = v.trim().parse::<usize>() {
                cfg.http_workers = n.max(1);
            }
        }

        cfg
    }

    pub fn with_read_only(mut self, on: bool) -> Self {
        self.read_only = on;
        self
    }

    pub fn with_snapshot(mut self, on: bool) -> Self {
        self.snapshot = on;
        self
    }

    pub fn with_snapshot_dir<P: Into<PathBuf>>(mut self, dir: Option<P>) -> Self {
        self.snapshot_dir = dir.map(Into::into);
        self
    }

    pub fn with_lock_file<S: Into<String>>(mut self, name: S) -> Self {
        self.lock_file = name.into();
        self
    }

    pub fn with_http_workers(mut self, n: usize) -> Self {
        self.http_workers = n.max(1);
        self
    }

    /// Effective parent for snapshot dirs.
    pub fn snapshot_parent(&self) -> PathBuf {
        self.snapshot_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

impl fmt::Display for InspectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InspectConfig {{ read_only: {}, snapshot: {}, snapshot_dir: {}, lock_file: {}, http_workers: {} }}",
            self.read_only,
            self.snapshot,
            self.snapshot_dir
                .as_deref()
                .map(Path::display)
                .map(|d| d.to_string())
                .unwrap_or_else(|| "default(tmp)".to_string()),
            self.lock_file,
            self.http_workers,
        )
    }
}
