use anyhow::Result;

use KeyScope::model::KeyListResponse;
use KeyScope::shutdown::ShutdownGate;
use KeyScope::util::{decode_key_arg, encode_key_arg};
use KeyScope::{PageRequest, SearchMode};

use super::cli::StoreArgs;
use super::util::open_inspector;

pub fn exec(
    store: StoreArgs,
    query: Option<String>,
    mode: SearchMode,
    limit: i64,
    offset: i64,
    json: bool,
    gate: &ShutdownGate,
) -> Result<()> {
    let q = match query {
        Some(s) => decode_key_arg(s.as_bytes())?,
        None => Vec::new(),
    };
    let (insp, _) = open_inspector(&store, gate)?;
    let req = PageRequest::new(q, mode, limit, offset);
    let res = insp.browse(&req);
    insp.shutdown();
    let page = res?;

    if json {
        println!("{}", serde_json::to_string_pretty(&KeyListResponse::from(&page))?);
        return Ok(());
    }

    if page.keys.is_empty() {
        println!("(no keys)");
    } else {
        for k in &page.keys {
            println!("{}", encode_key_arg(k));
        }
    }
    let total = page
        .total
        .map(|t| t.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    println!(
        "-- {} shown, total {} (mode={}, offset={}, limit={})",
        page.keys.len(),
        total,
        page.mode,
        page.offset,
        page.limit
    );
    Ok(())
}
