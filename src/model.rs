//! model — JSON shapes of the HTTP/CLI surface.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::browse::{Page, SearchMode};
use crate::stats::StoreStats;
use crate::util::{encode_key_arg, to_hex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyListResponse {
    /// Keys in `encode_key_arg` form: binary keys as `hex:<digits>`, so every
    /// listed key can be passed back to `/api/key/`.
    pub keys: Vec<String>,
    /// `null` when the prefix count failed (unknown, not zero).
    pub total: Option<u64>,
    pub offset: usize,
    pub limit: usize,
    pub mode: SearchMode,
}

impl From<&Page> for KeyListResponse {
    fn from(p: &Page) -> Self {
        Self {
            keys: p.keys.iter().map(|k| encode_key_arg(k)).collect(),
            total: p.total,
            offset: p.offset,
            limit: p.limit,
            mode: p.mode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueEncoding {
    Utf8,
    Base64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueResponse {
    pub key: String,
    /// UTF-8 text when the bytes are valid UTF-8, otherwise base64.
    pub value: String,
    pub encoding: ValueEncoding,
    pub value_hex: String,
    pub size: usize,
}

impl ValueResponse {
    pub fn new(key: &[u8], value: &[u8]) -> Self {
        let (text, encoding) = match std::str::from_utf8(value) {
            Ok(s) => (s.to_string(), ValueEncoding::Utf8),
            Err(_) => (
                base64::engine::general_purpose::STANDARD.encode(value),
                ValueEncoding::Base64,
            ),
        };
        Self {
            key: encode_key_arg(key),
            value: text,
            encoding,
            value_hex: to_hex(value),
            size: value.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_keys: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_keys: Option<u64>,
    pub db_path: String,
    pub db_size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl From<&StoreStats> for StatsResponse {
    fn from(s: &StoreStats) -> Self {
        Self {
            total_keys: s.total_keys,
            estimated_keys: s.estimated_keys,
            db_path: s.db_path.display().to_string(),
            db_size_bytes: s.db_size_bytes,
            warnings: s.warnings.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_value_is_text() {
        let v = ValueResponse::new(b"greeting", b"hi!");
        assert_eq!(v.value, "hi!");
        assert_eq!(v.encoding, ValueEncoding::Utf8);
        assert_eq!(v.value_hex, "686921");
        assert_eq!(v.size, 3);
    }

    #[test]
    fn binary_value_is_base64_with_exact_hex() {
        let bytes = [0xffu8, 0x00, 0x10];
        let v = ValueResponse::new(b"bin", &bytes);
        assert_eq!(v.encoding, ValueEncoding::Base64);
        assert_eq!(v.value, "/wAQ");
        assert_eq!(v.value_hex, "ff0010");
        assert_eq!(v.size, bytes.len());
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["encoding"], "base64");
    }

    #[test]
    fn unknown_total_serializes_as_null() {
        let page = Page {
            keys: vec![b"a".to_vec()],
            total: None,
            offset: 0,
            limit: 50,
            mode: SearchMode::Prefix,
        };
        let json = serde_json::to_value(KeyListResponse::from(&page)).unwrap();
        assert!(json["total"].is_null());
        assert_eq!(json["mode"], "prefix");
        assert_eq!(json["keys"][0], "a");
    }
}
