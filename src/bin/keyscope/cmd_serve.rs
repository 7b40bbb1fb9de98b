use anyhow::{anyhow, Result};
use log::{info, warn};
use std::sync::Arc;

use KeyScope::server;
use KeyScope::shutdown::ShutdownGate;

use super::cli::StoreArgs;
use super::util::open_inspector;

pub fn exec(
    store: StoreArgs,
    host: String,
    port: u16,
    workers: Option<usize>,
    gate: &ShutdownGate,
) -> Result<()> {
    let (insp, mut cfg) = open_inspector(&store, gate)?;
    if let Some(n) = workers {
        cfg = cfg.with_http_workers(n);
    }
    info!("{}", cfg);
    if let Some(p) = insp.snapshot_path() {
        info!("serving snapshot {} of {}", p.display(), insp.source_path().display());
    }
    let insp = Arc::new(insp);

    let addr = format!("{}:{}", host, port);
    let srv = server::start(&addr, Arc::clone(&insp), cfg.http_workers)?;
    // с этого момента сигнал не завершает процесс, а приходит сюда
    let rx = gate.subscribe();
    match srv.local_addr() {
        Some(a) => println!("listening on http://{} ({} workers)", a, cfg.http_workers),
        None => println!("listening on {} ({} workers)", addr, cfg.http_workers),
    }

    rx.recv().map_err(|_| anyhow!("signal channel closed"))?;

    // 1) перестаём принимать, ждём воркеров; 2) закрываем handle; 3) удаляем snapshot
    srv.shutdown();
    match Arc::try_unwrap(insp) {
        Ok(insp) => insp.shutdown(),
        Err(_) => warn!("inspector still shared at shutdown; snapshot is removed on drop"),
    }
    Ok(())
}
