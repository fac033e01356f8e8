//! Configuration for SentinelDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for a SentinelDB instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── data.log         (durable operation log)
    ///     ├── data.log.tmp     (compaction scratch, transient)
    ///     ├── snapshot.db      (export for backup, never read back)
    ///     └── snapshot.db.tmp  (export scratch, transient)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Log Configuration
    // -------------------------------------------------------------------------
    /// How far each record is pushed before a mutation is acknowledged
    pub log_sync_strategy: LogSyncStrategy,

    /// Compact automatically once this many obsolete records (log records
    /// that no longer back a live key) have piled up
    /// (None = only on explicit COMPACT)
    pub compaction_threshold: Option<u64>,

    // -------------------------------------------------------------------------
    // Snapshot Configuration
    // -------------------------------------------------------------------------
    /// Interval of the background exporter (None = disabled)
    pub snapshot_interval: Option<Duration>,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrently served client connections
    pub max_connections: usize,
}

/// Log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSyncStrategy {
    /// fsync after every record, before the write is acknowledged
    EveryWrite,

    /// Hand the record to the OS only (survives a process crash, not power loss)
    OsBuffered,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./sentineldb_data"),
            log_sync_strategy: LogSyncStrategy::EveryWrite,
            compaction_threshold: None,
            snapshot_interval: Some(Duration::from_secs(10)),
            listen_addr: "0.0.0.0:8080".to_string(),
            max_connections: 1024,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// File name of the durable log inside `data_dir`
    pub const LOG_FILENAME: &'static str = "data.log";

    /// File name of the compaction scratch file inside `data_dir`
    pub const COMPACTION_FILENAME: &'static str = "data.log.tmp";

    /// File name of the snapshot export inside `data_dir`
    pub const SNAPSHOT_FILENAME: &'static str = "snapshot.db";

    /// File name the snapshot is written to before being renamed into place
    pub const SNAPSHOT_SCRATCH_FILENAME: &'static str = "snapshot.db.tmp";

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(Self::LOG_FILENAME)
    }

    pub fn compaction_path(&self) -> PathBuf {
        self.data_dir.join(Self::COMPACTION_FILENAME)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(Self::SNAPSHOT_FILENAME)
    }

    pub fn snapshot_scratch_path(&self) -> PathBuf {
        self.data_dir.join(Self::SNAPSHOT_SCRATCH_FILENAME)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the log sync strategy
    pub fn log_sync_strategy(mut self, strategy: LogSyncStrategy) -> Self {
        self.config.log_sync_strategy = strategy;
        self
    }

    /// Set the auto-compaction threshold (in obsolete records)
    pub fn compaction_threshold(mut self, records: Option<u64>) -> Self {
        self.config.compaction_threshold = records;
        self
    }

    /// Set the periodic snapshot interval
    pub fn snapshot_interval(mut self, interval: Option<Duration>) -> Self {
        self.config.snapshot_interval = interval;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
