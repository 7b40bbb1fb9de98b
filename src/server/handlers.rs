//! server/handlers — routing of one request to the inspector.
//!
//! `route` is pure (method + raw URL in, `Reply` out) so it is testable without
//! sockets. Routes:
//! - GET /api/keys?q=&mode=&limit=&offset=
//! - GET /api/key/<percent-encoded key>   (`hex:<digits>` for binary keys)
//! - GET /api/stats
//! - GET /health, /metrics, /

use log::error;
use serde::Serialize;

use crate::browse::{PageRequest, SearchMode};
use crate::consts::{API_KEYS, API_KEY_PREFIX, API_STATS};
use crate::inspector::Inspector;
use crate::metrics::{render_prometheus, snapshot};
use crate::model::{ErrorResponse, KeyListResponse, StatsResponse, ValueResponse};
use crate::util::{decode_key_arg, split_url};

const CT_JSON: &str = "application/json";
const CT_TEXT: &str = "text/plain; charset=utf-8";
const CT_PROMETHEUS: &str = "text/plain; version=0.0.4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status,
                content_type: CT_JSON,
                body,
            },
            Err(e) => Self::error(500, &format!("encode response: {}", e)),
        }
    }

    fn error(status: u16, msg: &str) -> Self {
        let body = serde_json::to_string(&ErrorResponse {
            error: msg.to_string(),
        })
        .unwrap_or_else(|_| "{\"error\":\"internal\"}".to_string());
        Self {
            status,
            content_type: CT_JSON,
            body,
        }
    }

    fn text(status: u16, content_type: &'static str, body: String) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }
}

type Params = [(String, Vec<u8>)];

fn param<'a>(params: &'a Params, name: &str) -> Option<&'a [u8]> {
    params
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_slice())
}

/// Integer query parameter; absent or unparsable means 0.
fn int_param(params: &Params, name: &str) -> i64 {
    param(params, name)
        .and_then(|v| std::str::from_utf8(v).ok())
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

pub fn route(insp: &Inspector, method: &str, url: &str) -> Reply {
    if method != "GET" {
        return Reply::error(405, "method not allowed");
    }
    let (path, params) = split_url(url);

    match path.as_slice() {
        b"/" => Reply::text(
            200,
            CT_TEXT,
            format!(
                "keyscope {}: GET {}, {}<key>, {}, /metrics\n",
                env!("CARGO_PKG_VERSION"),
                API_KEYS,
                API_KEY_PREFIX,
                API_STATS
            ),
        ),
        b"/health" | b"/ready" => Reply::text(200, CT_TEXT, "OK\n".to_string()),
        b"/metrics" => Reply::text(200, CT_PROMETHEUS, render_prometheus(&snapshot())),
        p if p == API_KEYS.as_bytes() => list_keys(insp, &params),
        p if p == API_STATS.as_bytes() => stats(insp),
        p => match p.strip_prefix(API_KEY_PREFIX.as_bytes()) {
            Some(key) => get_key(insp, key),
            None => Reply::error(404, "not found"),
        },
    }
}

fn list_keys(insp: &Inspector, params: &Params) -> Reply {
    let mode_raw = param(params, "mode").unwrap_or_default();
    let mode = match std::str::from_utf8(mode_raw)
        .map_err(|_| "mode is not UTF-8".to_string())
        .and_then(str::parse::<SearchMode>)
    {
        Ok(m) => m,
        Err(msg) => return Reply::error(400, &msg),
    };
    let query = param(params, "q").unwrap_or_default().to_vec();
    let req = PageRequest::new(
        query,
        mode,
        int_param(params, "limit"),
        int_param(params, "offset"),
    );

    match insp.browse(&req) {
        Ok(page) => Reply::json(200, &KeyListResponse::from(&page)),
        Err(e) => {
            error!("list keys ({} mode): {}", mode, e);
            Reply::error(500, &e.to_string())
        }
    }
}

fn get_key(insp: &Inspector, raw: &[u8]) -> Reply {
    if raw.is_empty() {
        return Reply::error(400, "key is required");
    }
    let key = match decode_key_arg(raw) {
        Ok(k) => k,
        Err(e) => return Reply::error(400, &format!("bad key: {}", e)),
    };
    match insp.value(&key) {
        Ok(Some(v)) => Reply::json(200, &ValueResponse::new(&key, &v)),
        Ok(None) => Reply::error(404, "key not found"),
        Err(e) => {
            error!("get key: {}", e);
            Reply::error(500, &e.to_string())
        }
    }
}

fn stats(insp: &Inspector) -> Reply {
    let s = insp.stats();
    Reply::json(200, &StatsResponse::from(&s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;
    use serde_json::Value;

    fn inspector() -> Inspector {
        let mut store = MemStore::from_pairs([
            ("apple", "red"),
            ("applet", "tiny"),
            ("banana", "yellow"),
            ("grape", "green"),
            ("user:1 a", "spaced"),
        ]);
        store.insert(&[0x00, 0xff], &[0xde, 0xad, 0xbe, 0xef]);
        Inspector::with_store(Box::new(store), "/nonexistent/keyscope-store")
    }

    fn json(r: &Reply) -> Value {
        assert_eq!(r.content_type, CT_JSON);
        serde_json::from_str(&r.body).unwrap()
    }

    #[test]
    fn keys_prefix_default_mode_and_limit() {
        let insp = inspector();
        let r = route(&insp, "GET", "/api/keys?q=app");
        assert_eq!(r.status, 200);
        let v = json(&r);
        assert_eq!(v["keys"], serde_json::json!(["apple", "applet"]));
        assert_eq!(v["total"], 2);
        assert_eq!(v["limit"], 50);
        assert_eq!(v["offset"], 0);
        assert_eq!(v["mode"], "prefix");
    }

    #[test]
    fn keys_substring_with_paging() {
        let insp = inspector();
        let r = route(&insp, "GET", "/api/keys?q=an&mode=substring&limit=1&offset=0");
        let v = json(&r);
        assert_eq!(v["keys"], serde_json::json!(["banana"]));
        assert_eq!(v["total"], 1);
        assert_eq!(v["limit"], 1);

        let r = route(&insp, "GET", "/api/keys?q=p&mode=substring&limit=x&offset=-4");
        let v = json(&r);
        assert_eq!(v["limit"], 50, "unparsable limit falls back to default");
        assert_eq!(v["offset"], 0);
        assert_eq!(v["total"], 3);
    }

    #[test]
    fn keys_bad_mode_is_400() {
        let insp = inspector();
        let r = route(&insp, "GET", "/api/keys?mode=regex");
        assert_eq!(r.status, 400);
        assert!(json(&r)["error"].as_str().unwrap().contains("regex"));
    }

    #[test]
    fn value_found_with_hex_and_size() {
        let insp = inspector();
        let r = route(&insp, "GET", "/api/key/banana");
        assert_eq!(r.status, 200);
        let v = json(&r);
        assert_eq!(v["key"], "banana");
        assert_eq!(v["value"], "yellow");
        assert_eq!(v["value_hex"], "79656c6c6f77");
        assert_eq!(v["size"], 6);

        let r = route(&insp, "GET", "/api/key/user%3A1%20a");
        assert_eq!(json(&r)["value"], "spaced");
    }

    #[test]
    fn binary_key_via_hex_and_percent() {
        let insp = inspector();
        for url in ["/api/key/hex:00ff", "/api/key/%00%FF"] {
            let r = route(&insp, "GET", url);
            assert_eq!(r.status, 200, "{url}");
            let v = json(&r);
            assert_eq!(v["encoding"], "base64");
            assert_eq!(v["value_hex"], "deadbeef");
            assert_eq!(v["size"], 4);
        }
    }

    #[test]
    fn listed_binary_key_can_be_fetched() {
        let insp = inspector();
        let r = route(&insp, "GET", "/api/keys?limit=1");
        let listed = json(&r)["keys"][0].as_str().unwrap().to_string();
        assert_eq!(listed, "hex:00ff");

        let r = route(&insp, "GET", &format!("/api/key/{}", listed));
        assert_eq!(r.status, 200);
        let v = json(&r);
        assert_eq!(v["key"], "hex:00ff");
        assert_eq!(v["value_hex"], "deadbeef");
    }

    #[test]
    fn value_missing_and_empty_key() {
        let insp = inspector();
        let r = route(&insp, "GET", "/api/key/cherry");
        assert_eq!(r.status, 404);
        assert_eq!(json(&r)["error"], "key not found");

        let r = route(&insp, "GET", "/api/key/");
        assert_eq!(r.status, 400);
    }

    #[test]
    fn stats_reports_count_and_unknown_size() {
        let insp = inspector();
        let r = route(&insp, "GET", "/api/stats");
        assert_eq!(r.status, 200);
        let v = json(&r);
        assert_eq!(v["total_keys"], 6);
        assert_eq!(v["db_path"], "/nonexistent/keyscope-store");
        assert!(v["db_size_bytes"].is_null());
        assert_eq!(v["warnings"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn scan_failure_is_500_not_empty_page() {
        let store = MemStore::from_pairs([("a", ""), ("b", "")]).with_scan_fault_after(1);
        let insp = Inspector::with_store(Box::new(store), "/nonexistent");
        let r = route(&insp, "GET", "/api/keys?mode=substring");
        assert_eq!(r.status, 500);
        assert!(json(&r)["error"].as_str().unwrap().contains("scan failed"));
    }

    #[test]
    fn misc_routes() {
        let insp = inspector();
        assert_eq!(route(&insp, "GET", "/health").body, "OK\n");
        assert_eq!(route(&insp, "POST", "/api/keys").status, 405);
        assert_eq!(route(&insp, "GET", "/nope").status, 404);
        let m = route(&insp, "GET", "/metrics");
        assert_eq!(m.content_type, CT_PROMETHEUS);
        assert!(m.body.contains("keyscope_build_info"));
    }
}
