//! Lightweight global metrics for KeyScope.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - HTTP (requests / errors)
//! - Browse (prefix / substring, keys visited, scan errors)
//! - Value lookups (hits / not found)
//! - Snapshot provisioning

use std::sync::atomic::{AtomicU64, Ordering};

// ----- HTTP -----
static HTTP_REQUESTS_TOTAL: AtomicU64 = AtomicU64::new(0);
static HTTP_ERRORS_TOTAL: AtomicU64 = AtomicU64::new(0);

// ----- Browse -----
static BROWSE_PREFIX_TOTAL: AtomicU64 = AtomicU64::new(0);
static BROWSE_SUBSTRING_TOTAL: AtomicU64 = AtomicU64::new(0);
static KEYS_VISITED_TOTAL: AtomicU64 = AtomicU64::new(0);
static SCAN_ERRORS_TOTAL: AtomicU64 = AtomicU64::new(0);

// ----- Values -----
static VALUE_LOOKUPS_TOTAL: AtomicU64 = AtomicU64::new(0);
static VALUE_NOT_FOUND_TOTAL: AtomicU64 = AtomicU64::new(0);

// ----- Snapshot -----
static SNAPSHOTS_PROVISIONED: AtomicU64 = AtomicU64::new(0);
static SNAPSHOT_FILES_LINKED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    // HTTP
    pub http_requests_total: u64,
    pub http_errors_total: u64,

    // Browse
    pub browse_prefix_total: u64,
    pub browse_substring_total: u64,
    pub keys_visited_total: u64,
    pub scan_errors_total: u64,

    // Values
    pub value_lookups_total: u64,
    pub value_not_found_total: u64,

    // Snapshot
    pub snapshots_provisioned: u64,
    pub snapshot_files_linked: u64,
}

impl MetricsSnapshot {
    pub fn not_found_ratio(&self) -> f64 {
        if self.value_lookups_total == 0 {
            0.0
        } else {
            self.value_not_found_total as f64 / self.value_lookups_total as f64
        }
    }
}

// ----- Recorders (HTTP) -----
pub fn record_http_request() {
    HTTP_REQUESTS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub fn record_http_error() {
    HTTP_ERRORS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Browse) -----
pub fn record_browse_prefix() {
    BROWSE_PREFIX_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub fn record_browse_substring() {
    BROWSE_SUBSTRING_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub fn record_keys_visited(n: u64) {
    KEYS_VISITED_TOTAL.fetch_add(n, Ordering::Relaxed);
}

pub fn record_scan_error() {
    SCAN_ERRORS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Values) -----
pub fn record_value_lookup(found: bool) {
    VALUE_LOOKUPS_TOTAL.fetch_add(1, Ordering::Relaxed);
    if !found {
        VALUE_NOT_FOUND_TOTAL.fetch_add(1, Ordering::Relaxed);
    }
}

// ----- Recorders (Snapshot) -----
pub fn record_snapshot_provisioned(files_linked: usize) {
    SNAPSHOTS_PROVISIONED.fetch_add(1, Ordering::Relaxed);
    SNAPSHOT_FILES_LINKED.fetch_add(files_linked as u64, Ordering::Relaxed);
}

// ----- Snapshot -----
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        http_requests_total: HTTP_REQUESTS_TOTAL.load(Ordering::Relaxed),
        http_errors_total: HTTP_ERRORS_TOTAL.load(Ordering::Relaxed),

        browse_prefix_total: BROWSE_PREFIX_TOTAL.load(Ordering::Relaxed),
        browse_substring_total: BROWSE_SUBSTRING_TOTAL.load(Ordering::Relaxed),
        keys_visited_total: KEYS_VISITED_TOTAL.load(Ordering::Relaxed),
        scan_errors_total: SCAN_ERRORS_TOTAL.load(Ordering::Relaxed),

        value_lookups_total: VALUE_LOOKUPS_TOTAL.load(Ordering::Relaxed),
        value_not_found_total: VALUE_NOT_FOUND_TOTAL.load(Ordering::Relaxed),

        snapshots_provisioned: SNAPSHOTS_PROVISIONED.load(Ordering::Relaxed),
        snapshot_files_linked: SNAPSHOT_FILES_LINKED.load(Ordering::Relaxed),
    }
}

/// Render the snapshot in Prometheus text exposition format.
pub fn render_prometheus(m: &MetricsSnapshot) -> String {
    let mut out = String::new();

    let ver = env!("CARGO_PKG_VERSION");
    out.push_str("# HELP keyscope_build_info Build info.\n");
    out.push_str("# TYPE keyscope_build_info gauge\n");
    out.push_str(&format!("keyscope_build_info{{version=\"{}\"}} 1\n", ver));

    let counters: [(&str, &str, u64); 10] = [
        ("keyscope_http_requests_total", "HTTP requests received.", m.http_requests_total),
        ("keyscope_http_errors_total", "HTTP responses with status >= 400.", m.http_errors_total),
        ("keyscope_browse_prefix_total", "Prefix-mode browse calls.", m.browse_prefix_total),
        ("keyscope_browse_substring_total", "Substring-mode browse calls.", m.browse_substring_total),
        ("keyscope_keys_visited_total", "Keys visited by all scans.", m.keys_visited_total),
        ("keyscope_scan_errors_total", "Scans aborted by an engine error.", m.scan_errors_total),
        ("keyscope_value_lookups_total", "Point lookups.", m.value_lookups_total),
        ("keyscope_value_not_found_total", "Point lookups for absent keys.", m.value_not_found_total),
        ("keyscope_snapshots_provisioned", "Hard-link snapshots provisioned.", m.snapshots_provisioned),
        ("keyscope_snapshot_files_linked", "Files hard-linked into snapshots.", m.snapshot_files_linked),
    ];
    for (name, help, v) in counters {
        out.push_str(&format!("# HELP {} {}\n", name, help));
        out.push_str(&format!("# TYPE {} counter\n", name));
        out.push_str(&format!("{} {}\n", name, v));
    }

    out.push_str("# HELP keyscope_value_not_found_ratio Not-found share of lookups (percent).\n");
    out.push_str("# TYPE keyscope_value_not_found_ratio gauge\n");
    out.push_str(&format!(
        "keyscope_value_not_found_ratio {:.2}\n",
        m.not_found_ratio() * 100.0
    ));

    out
}
