//! util — общие хелперы для CLI и HTTP-слоя (hex, ключи в текстовом виде, URL-декод).

use anyhow::{anyhow, Result};

const HEX_KEY_PREFIX: &[u8] = b"hex:";

pub fn to_hex(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push(DIGITS[(b >> 4) as usize] as char);
        s.push(DIGITS[(b & 0x0f) as usize] as char);
    }
    s
}

/// Offset-prefixed dump, 16 bytes per row: `00000010  de ad be ef ...`.
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let cells: Vec<String> = chunk.iter().map(|b| to_hex(&[*b])).collect();
            format!("{:08x}  {}", row * 16, cells.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn nibble(c: u8, pos: usize) -> Result<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(anyhow!("invalid hex digit {:?} at pos {}", c as char, pos)),
    }
}

fn parse_hex(digits: &[u8]) -> Result<Vec<u8>> {
    if digits.len() % 2 != 0 {
        return Err(anyhow!("hex key must have an even number of digits"));
    }
    digits
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| Ok((nibble(pair[0], 2 * i)? << 4) | nibble(pair[1], 2 * i + 1)?))
        .collect()
}

/// Key argument as typed by an operator: `hex:<digits>` addresses binary keys,
/// anything else is taken literally.
pub fn decode_key_arg(arg: &[u8]) -> Result<Vec<u8>> {
    match arg.strip_prefix(HEX_KEY_PREFIX) {
        Some(hx) => parse_hex(hx),
        None => Ok(arg.to_vec()),
    }
}

/// Printable form of a key that `decode_key_arg` maps back to the same bytes:
/// UTF-8 keys as is, everything else (and UTF-8 keys that themselves start
/// with `hex:`) as `hex:<digits>`.
pub fn encode_key_arg(key: &[u8]) -> String {
    match std::str::from_utf8(key) {
        Ok(s) if !key.starts_with(HEX_KEY_PREFIX) => s.to_string(),
        _ => format!("hex:{}", to_hex(key)),
    }
}

/// Percent-decode a URL component into raw bytes.
///
/// `plus_as_space` is for query strings (form encoding); path segments keep '+'.
/// A malformed escape is kept verbatim, like most browsers do.
pub fn percent_decode(s: &str, plus_as_space: bool) -> Vec<u8> {
    let b = s.as_bytes();
    let mut out = Vec::with_capacity(b.len());
    let mut i = 0;
    while i < b.len() {
        match b[i] {
            b'%' if i + 2 < b.len() => {
                let hi = (b[i + 1] as char).to_digit(16);
                let lo = (b[i + 2] as char).to_digit(16);
                match (hi, lo) {
                    (Some(h), Some(l)) => {
                        out.push(((h << 4) | l) as u8);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Split `url` into its decoded path and decoded `(name, value)` query pairs.
pub fn split_url(url: &str) -> (Vec<u8>, Vec<(String, Vec<u8>)>) {
    let (path, query) = match url.split_once('?') {
        Some((p, q)) => (p, q),
        None => (url, ""),
    };
    let mut params = Vec::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = String::from_utf8_lossy(&percent_decode(name, true)).into_owned();
        params.push((name, percent_decode(value, true)));
    }
    (percent_decode(path, false), params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_dump() {
        assert_eq!(to_hex(&[0x00, 0xab, 0x10, 0xff]), "00ab10ff");
        let dump = hex_dump(&[0u8; 17]);
        let rows: Vec<&str> = dump.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("00000000  00 00"));
        assert_eq!(rows[1], "00000010  00");
        assert_eq!(hex_dump(&[]), "");
    }

    #[test]
    fn key_arg_hex_prefix() {
        assert_eq!(decode_key_arg(b"hex:00ff").unwrap(), vec![0x00, 0xff]);
        assert_eq!(decode_key_arg(b"hex:00FF").unwrap(), vec![0x00, 0xff]);
        assert_eq!(decode_key_arg(b"plain").unwrap(), b"plain".to_vec());
        assert!(decode_key_arg(b"hex:0").is_err());
        assert!(decode_key_arg(b"hex:zz").is_err());
    }

    #[test]
    fn listed_keys_decode_back_to_same_bytes() {
        let keys: [&[u8]; 5] = [
            b"user:1",
            &[0xff, 0x00, 0x10],
            b"hex:literal",
            b"",
            "ключ".as_bytes(),
        ];
        for k in keys {
            let shown = encode_key_arg(k);
            assert_eq!(decode_key_arg(shown.as_bytes()).unwrap(), k.to_vec(), "{shown}");
        }
        assert_eq!(encode_key_arg(&[0xff, 0x00]), "hex:ff00");
        assert_eq!(encode_key_arg(b"hex:x"), "hex:6865783a78");
        assert_eq!(encode_key_arg(b"apple"), "apple");
    }

    #[test]
    fn percent_decoding() {
        assert_eq!(percent_decode("a%20b+c", true), b"a b c".to_vec());
        assert_eq!(percent_decode("a%20b+c", false), b"a b+c".to_vec());
        assert_eq!(percent_decode("%ff%00", false), vec![0xff, 0x00]);
        // malformed escapes are kept
        assert_eq!(percent_decode("100%", false), b"100%".to_vec());
        assert_eq!(percent_decode("%zz", false), b"%zz".to_vec());
        assert_eq!(percent_decode("%4", false), b"%4".to_vec());
    }

    #[test]
    fn url_splitting() {
        let (path, params) = split_url("/api/keys?q=user%3A1&mode=substring&limit=&flag");
        assert_eq!(path, b"/api/keys".to_vec());
        assert_eq!(
            params,
            vec![
                ("q".to_string(), b"user:1".to_vec()),
                ("mode".to_string(), b"substring".to_vec()),
                ("limit".to_string(), Vec::new()),
                ("flag".to_string(), Vec::new()),
            ]
        );
        let (path, params) = split_url("/api/key/a%2Fb");
        assert_eq!(path, b"/api/key/a/b".to_vec());
        assert!(params.is_empty());
    }
}
