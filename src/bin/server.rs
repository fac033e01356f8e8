//! SentinelDB Server Binary
//!
//! Starts the TCP server for SentinelDB.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use sentineldb::config::LogSyncStrategy;
use sentineldb::exporter::PeriodicExporter;
use sentineldb::network::Server;
use sentineldb::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// SentinelDB Server
#[derive(Parser, Debug)]
#[command(name = "sentineldb-server")]
#[command(about = "In-memory key-value store with a durable operation log")]
#[command(version)]
struct Args {
    /// Data directory (holds data.log and snapshot.db)
    #[arg(short, long, default_value = "./sentineldb_data")]
    data_dir: PathBuf,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Seconds between background snapshots (0 disables)
    #[arg(short, long, default_value = "10")]
    snapshot_secs: u64,

    /// Compact the log once it holds this many obsolete records
    #[arg(short, long)]
    compact_after: Option<u64>,

    /// How far each record is pushed before a write is acknowledged
    #[arg(long, value_enum, default_value = "every-write")]
    sync: SyncArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SyncArg {
    /// fsync every record
    EveryWrite,
    /// Hand records to the OS without fsync
    OsBuffered,
}

impl From<SyncArg> for LogSyncStrategy {
    fn from(arg: SyncArg) -> Self {
        match arg {
            SyncArg::EveryWrite => LogSyncStrategy::EveryWrite,
            SyncArg::OsBuffered => LogSyncStrategy::OsBuffered,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sentineldb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("SentinelDB Server v{}", sentineldb::VERSION);
    tracing::info!("Data directory: {}", args.data_dir.display());
    tracing::info!("Listen address: {}", args.listen);

    let snapshot_interval = (args.snapshot_secs > 0).then(|| Duration::from_secs(args.snapshot_secs));

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .snapshot_interval(snapshot_interval)
        .compaction_threshold(args.compact_after)
        .log_sync_strategy(args.sync.into())
        .build();

    // Open engine (replays the log)
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized with {} keys", engine.len());

    let _exporter = match config.snapshot_interval {
        Some(interval) => match PeriodicExporter::start(Arc::clone(&engine), interval) {
            Ok(exporter) => Some(exporter),
            Err(e) => {
                tracing::error!("Failed to start periodic exporter: {}", e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    let server = match Server::bind(config, engine) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
