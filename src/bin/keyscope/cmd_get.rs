use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use KeyScope::model::{ErrorResponse, ValueResponse};
use KeyScope::shutdown::ShutdownGate;
use KeyScope::util::{decode_key_arg, hex_dump};

use super::cli::StoreArgs;
use super::util::open_inspector;

pub fn exec(
    store: StoreArgs,
    key: String,
    out: Option<PathBuf>,
    json: bool,
    gate: &ShutdownGate,
) -> Result<()> {
    let k = decode_key_arg(key.as_bytes())?;
    let (insp, _) = open_inspector(&store, gate)?;
    let res = insp.value(&k);
    insp.shutdown();

    match res? {
        Some(v) => {
            if let Some(out_path) = out {
                if let Some(parent) = out_path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                let mut f = OpenOptions::new()
                    .create(true)
                    .truncate(true)
                    .write(true)
                    .open(&out_path)
                    .with_context(|| format!("open {}", out_path.display()))?;
                f.write_all(&v)?;
                f.sync_all()?;
                println!(
                    "FOUND '{}': {} B -> wrote to {}",
                    key,
                    v.len(),
                    out_path.display()
                );
            } else if json {
                println!("{}", serde_json::to_string_pretty(&ValueResponse::new(&k, &v))?);
            } else {
                println!("FOUND '{}': {} B", key, v.len());
                match std::str::from_utf8(&v) {
                    Ok(text) => println!("text: {}", text),
                    Err(_) => println!("text: (binary {} B)", v.len()),
                }
                println!("{}", hex_dump(&v[..v.len().min(64)]));
            }
        }
        None => {
            if json {
                let e = ErrorResponse {
                    error: "key not found".to_string(),
                };
                println!("{}", serde_json::to_string(&e)?);
            } else {
                println!("NOT FOUND '{}'", key);
            }
        }
    }
    Ok(())
}
