//! Общие константы (store layout, paging, snapshot, HTTP).

// -------- Store layout --------
/// Exclusive-lock file the engine keeps in the store root. Never hard-linked.
pub const LOCK_FILE: &str = "LOCK";

// -------- Paging --------
/// Limit used when a request carries limit <= 0.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

// -------- Snapshot --------
pub const SNAPSHOT_DIR_PREFIX: &str = "keyscope-snapshot-";

// -------- HTTP --------
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HTTP_WORKERS: usize = 4;

pub const API_KEYS: &str = "/api/keys";
pub const API_KEY_PREFIX: &str = "/api/key/";
pub const API_STATS: &str = "/api/stats";
