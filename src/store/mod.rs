//! Store Module
//!
//! The in-memory key → value map together with the durable log that backs it.
//!
//! ## Responsibilities
//! - Rebuild the map on open by replaying the log
//! - Append a record (durably) before every mutation of the map
//! - Compact the log down to one record per live key
//! - Export point-in-time snapshots for backup
//!
//! `Store` itself is not synchronized: every mutating method takes
//! `&mut self`. [`crate::Engine`] owns it behind a single `RwLock`, which is
//! what makes the map and the log change together.

mod compaction;
mod snapshot;

pub use compaction::{CompactionStats, Compactor};
pub use snapshot::{SnapshotExporter, SnapshotStats};

use std::collections::HashMap;
use std::fs;

use crate::config::Config;
use crate::error::{Result, SentinelError};
use crate::log::{LogRecord, LogRecovery, LogWriter, RecoveryResult};

/// The key-value map plus its durable log
pub struct Store {
    config: Config,

    /// Live entries
    table: HashMap<Vec<u8>, Vec<u8>>,

    /// Append handle on the durable log
    log: LogWriter,

    /// Records currently in the log file (recovered + malformed + appended)
    log_records: u64,

    /// Set when the log file was replaced but the writer could not reopen it
    needs_reopen: bool,

    /// Stats from the replay performed on open
    recovery: RecoveryResult,
}

impl Store {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Create the data directory and drop abandoned scratch files
    /// 2. Recover the log (torn tail dropped, malformed lines skipped)
    /// 3. Replay records into an empty map
    /// 4. Open the log for appends
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let log_path = config.log_path();

        // Leftover scratch files mean a compaction or export died before its
        // rename; the files they were meant to replace are still authoritative.
        for scratch in [config.compaction_path(), config.snapshot_scratch_path()] {
            if scratch.exists() {
                tracing::warn!("Removing abandoned scratch file {}", scratch.display());
                fs::remove_file(&scratch)?;
            }
        }

        let (records, recovery) = LogRecovery::recover(&log_path)?;

        let mut table = HashMap::new();
        for record in records {
            record.apply(&mut table);
        }

        if recovery.records_recovered > 0 || recovery.records_malformed > 0 {
            tracing::info!(
                "Log recovery: {} records replayed, {} malformed skipped, {} live keys",
                recovery.records_recovered,
                recovery.records_malformed,
                table.len()
            );
        }

        let log = LogWriter::open(&log_path, config.log_sync_strategy)?;

        Ok(Self {
            // Skipped malformed lines still occupy the file until compacted
            log_records: recovery.records_recovered + recovery.records_malformed,
            config,
            table,
            log,
            needs_reopen: false,
            recovery,
        })
    }

    /// Get a value by key; `None` is the absent sentinel, not a failure
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.table.get(key).map(Vec::as_slice)
    }

    /// Set a key to a value
    ///
    /// Steps:
    /// 1. Validate key and value
    /// 2. Append `SET` to the log (durable on return)
    /// 3. Update the map
    /// 4. Compact if the log has grown past the threshold
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        validate_key(key)?;
        validate_value(value)?;

        self.append(&LogRecord::set(key, value))?;
        self.table.insert(key.to_vec(), value.to_vec());

        self.maybe_compact();
        Ok(())
    }

    /// Delete a key
    ///
    /// The `DEL` record is appended even when the key is absent. Returns
    /// whether the key was present.
    pub fn delete(&mut self, key: &[u8]) -> Result<bool> {
        validate_key(key)?;

        self.append(&LogRecord::del(key))?;
        let existed = self.table.remove(key).is_some();

        self.maybe_compact();
        Ok(existed)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Iterate over live entries (unordered)
    pub fn entries(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.table.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// Records in the log that no longer correspond to a live key
    pub fn obsolete_records(&self) -> u64 {
        self.log_records.saturating_sub(self.table.len() as u64)
    }

    /// Total records currently in the log file
    pub fn log_records(&self) -> u64 {
        self.log_records
    }

    /// Stats from the replay performed on open
    pub fn recovery(&self) -> &RecoveryResult {
        &self.recovery
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn append(&mut self, record: &LogRecord) -> Result<()> {
        if self.needs_reopen {
            self.log
                .reopen()
                .map_err(|e| SentinelError::LogWrite(format!("reopen after compaction: {}", e)))?;
            self.needs_reopen = false;
        }

        self.log.append(record)?;
        self.log_records += 1;
        Ok(())
    }

    /// Auto-compaction; runs inside the caller's exclusive hold
    fn maybe_compact(&mut self) {
        let Some(threshold) = self.config.compaction_threshold else {
            return;
        };
        if self.obsolete_records() < threshold {
            return;
        }

        // The triggering mutation is already durable; a failed compaction
        // only means the log stays long.
        if let Err(e) = self.compact() {
            tracing::error!("Automatic compaction failed: {}", e);
        }
    }
}

/// Keys are single non-empty tokens of the line format
fn validate_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(SentinelError::InvalidKey("key must not be empty".to_string()));
    }
    if key.iter().any(u8::is_ascii_whitespace) {
        return Err(SentinelError::InvalidKey(
            "key must not contain whitespace".to_string(),
        ));
    }
    Ok(())
}

/// Values may be empty but must stay a single token
fn validate_value(value: &[u8]) -> Result<()> {
    if value.iter().any(u8::is_ascii_whitespace) {
        return Err(SentinelError::InvalidValue(
            "value must not contain whitespace".to_string(),
        ));
    }
    Ok(())
}
