use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};

use KeyScope::shutdown::{ShutdownGate, SignalAction};

mod cli;
mod util;
mod cmd_serve;
mod cmd_keys;
mod cmd_get;
mod cmd_stats;
mod cmd_snapshot;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug keyscope serve --db ./data
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

/// SIGINT/SIGTERM before anything touches the filesystem: until `serve` is up
/// the handler removes the tracked snapshot and exits on its own.
fn install_signal_handler() -> Result<ShutdownGate> {
    let gate = ShutdownGate::new();
    let g = gate.clone();
    ctrlc::set_handler(move || {
        if g.on_signal() == SignalAction::Exit {
            std::process::exit(130);
        }
    })
    .context("install SIGINT/SIGTERM handler")?;
    Ok(gate)
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    let gate = install_signal_handler()?;
    match cli.cmd {
        cli::Cmd::Serve { store, host, port, workers } =>
            cmd_serve::exec(store, host, port, workers, &gate),

        cli::Cmd::Keys { store, query, mode, limit, offset, json } =>
            cmd_keys::exec(store, query, mode, limit, offset, json, &gate),

        cli::Cmd::Get { store, key, out, json } =>
            cmd_get::exec(store, key, out, json, &gate),

        cli::Cmd::Stats { store, json } =>
            cmd_stats::exec(store, json, &gate),

        cli::Cmd::Snapshot { store } =>
            cmd_snapshot::exec(store, &gate),
    }
}
