use anyhow::Result;

use KeyScope::model::StatsResponse;
use KeyScope::shutdown::ShutdownGate;

use super::cli::StoreArgs;
use super::util::open_inspector;

fn or_unknown(v: Option<u64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| "unknown".to_string())
}

pub fn exec(store: StoreArgs, json: bool, gate: &ShutdownGate) -> Result<()> {
    let (insp, _) = open_inspector(&store, gate)?;
    let s = insp.stats();
    insp.shutdown();

    if json {
        println!("{}", serde_json::to_string_pretty(&StatsResponse::from(&s))?);
        return Ok(());
    }

    println!("KeyScope stats:");
    println!("  path            = {}", s.db_path.display());
    println!("  total_keys      = {}", or_unknown(s.total_keys));
    if let Some(est) = s.estimated_keys {
        println!("  estimated_keys  = {}", est);
    }
    println!("  db_size_bytes   = {}", or_unknown(s.db_size_bytes));
    for w in &s.warnings {
        println!("  warning: {}", w);
    }
    Ok(())
}
