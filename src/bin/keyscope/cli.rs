use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use KeyScope::consts::{DEFAULT_HOST, DEFAULT_PORT};
use KeyScope::SearchMode;

/// Read-only browser for RocksDB key spaces
#[derive(Parser, Debug)]
#[command(name = "keyscope", version, about = "KeyScope: browse keys of a RocksDB store")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

/// Где лежит база и как её открывать.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Store directory
    #[arg(long)]
    pub db: PathBuf,
    /// Open a hard-link snapshot of the directory (without LOCK) instead of the live one
    #[arg(long)]
    pub snapshot: bool,
    /// Parent directory for the snapshot (must be on the same filesystem as --db)
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,
    /// Open read-write (takes the engine lock)
    #[arg(long)]
    pub read_write: bool,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Serve the HTTP API until SIGINT/SIGTERM
    Serve {
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Worker threads (overrides KS_HTTP_WORKERS)
        #[arg(long)]
        workers: Option<usize>,
    },
    /// List one page of keys
    Keys {
        #[command(flatten)]
        store: StoreArgs,
        /// Prefix or substring; `hex:<digits>` for binary patterns
        #[arg(long)]
        query: Option<String>,
        #[arg(long, default_value = "prefix")]
        mode: SearchMode,
        /// Page size; 0 or negative means the default (50)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        limit: i64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,
        #[arg(long)]
        json: bool,
    },
    /// Get value of one key
    Get {
        #[command(flatten)]
        store: StoreArgs,
        /// Key; `hex:<digits>` for binary keys
        #[arg(long)]
        key: String,
        /// Optional file to write raw value into
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Key count and on-disk size
    Stats {
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long)]
        json: bool,
    },
    /// Provision a snapshot, list linked files, remove it (dry run)
    Snapshot {
        #[command(flatten)]
        store: StoreArgs,
    },
}
