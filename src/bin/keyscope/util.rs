use anyhow::{Context, Result};
use log::debug;

use KeyScope::shutdown::ShutdownGate;
use KeyScope::{InspectConfig, Inspector};

use super::cli::StoreArgs;

/// Env (`KS_*`) first, then CLI flags on top.
pub fn config_from(args: &StoreArgs) -> InspectConfig {
    let mut cfg = InspectConfig::from_env();
    if args.snapshot {
        cfg = cfg.with_snapshot(true);
    }
    if args.snapshot_dir.is_some() {
        cfg = cfg.with_snapshot_dir(args.snapshot_dir.clone());
    }
    if args.read_write {
        cfg = cfg.with_read_only(false);
    }
    cfg
}

pub fn open_inspector(
    args: &StoreArgs,
    gate: &ShutdownGate,
) -> Result<(Inspector, InspectConfig)> {
    let cfg = config_from(args);
    debug!("config: {}", cfg);
    let insp = Inspector::open_guarded(&args.db, &cfg, gate)
        .with_context(|| format!("open store {}", args.db.display()))?;
    Ok((insp, cfg))
}
