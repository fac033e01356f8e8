//! Engine Module
//!
//! The coordinator every connection shares.
//!
//! ## Responsibilities
//! - Own the single `Store` (map + durable log) behind one lock
//! - Route decoded commands to store operations
//! - Turn outcomes into replies, keeping protocol errors and durability
//!   failures apart

use std::path::Path;

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{Result, SentinelError};
use crate::protocol::{Command, Reply};
use crate::store::{CompactionStats, SnapshotStats, Store};

/// The shared storage engine
///
/// ## Concurrency Model: one readers-writer lock
///
/// - **Reads** (`get`): shared mode, concurrent with other reads
/// - **Everything else** (`set`, `delete`, `save`, `compact`): exclusive mode
///   - The durable log append (and its fsync) happens while the lock is held,
///     so the log and the map agree whenever the lock is free
///
/// Each call acquires the lock exactly once and never nests, so commands
/// from different connections interleave at command granularity and cannot
/// deadlock each other.
pub struct Engine {
    store: RwLock<Store>,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// Replays the durable log before returning.
    pub fn open(config: Config) -> Result<Self> {
        let store = Store::open(config)?;
        Ok(Self {
            store: RwLock::new(store),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers. Always yields exactly one
    /// reply; `Exit` does not touch the store.
    pub fn execute(&self, command: Command) -> Reply {
        let outcome = match command {
            Command::Get { key } => Ok(match self.get(&key) {
                Some(value) => Reply::Value(value),
                None => Reply::Nil,
            }),
            Command::Set { key, value } => self.set(&key, &value).map(|_| Reply::Ok),
            Command::Del { key } => self.delete(&key).map(|_| Reply::Ok),
            Command::Save => self.save().map(|_| Reply::SnapshotSaved),
            Command::Compact => self.compact().map(|_| Reply::Compacted),
            Command::Exit => Ok(Reply::Bye),
        };

        outcome.unwrap_or_else(error_reply)
    }

    /// Get a value by key (shared lock)
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.store.read().get(key).map(<[u8]>::to_vec)
    }

    /// Set a key (exclusive lock); durable once this returns `Ok`
    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.store.write().set(key, value)
    }

    /// Delete a key (exclusive lock); returns whether it was present
    pub fn delete(&self, key: &[u8]) -> Result<bool> {
        self.store.write().delete(key)
    }

    /// Export a snapshot (exclusive lock, so no mutation is half-applied)
    pub fn save(&self) -> Result<SnapshotStats> {
        self.store.write().save()
    }

    /// Compact the durable log (exclusive lock)
    pub fn compact(&self) -> Result<CompactionStats> {
        self.store.write().compact()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    /// Records currently in the durable log
    pub fn log_records(&self) -> u64 {
        self.store.read().log_records()
    }

    /// Get the configuration
    pub fn config(&self) -> Config {
        self.store.read().config().clone()
    }
}

fn error_reply(error: SentinelError) -> Reply {
    if error.is_durability() {
        tracing::error!("Durability failure: {}", error);
        Reply::IoError(error.to_string())
    } else {
        Reply::Error(error.to_string())
    }
}
