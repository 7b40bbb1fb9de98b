use anyhow::{Context, Result};

use KeyScope::provision;
use KeyScope::shutdown::ShutdownGate;

use super::cli::StoreArgs;
use super::util::config_from;

pub fn exec(store: StoreArgs, gate: &ShutdownGate) -> Result<()> {
    let cfg = config_from(&store);
    let parent = cfg.snapshot_parent();
    let snap = provision(&store.db, &parent, &cfg.lock_file)
        .with_context(|| format!("snapshot {} into {}", store.db.display(), parent.display()))?;
    gate.track_snapshot(snap.path());

    println!("snapshot {} of {}", snap.path().display(), snap.source().display());
    if snap.files().is_empty() {
        println!("  (no files linked)");
    }
    for f in snap.files() {
        println!("  linked {}", f.display());
    }
    println!("  skipped {}", cfg.lock_file);

    let path = snap.path().to_path_buf();
    let res = snap.remove();
    gate.untrack_snapshot();
    res.with_context(|| format!("remove snapshot {}", path.display()))?;
    println!("removed {}", path.display());
    Ok(())
}
