//! Log Writer
//!
//! Handles appending records to the durable log file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::LogSyncStrategy;
use crate::error::{Result, SentinelError};
use super::LogRecord;

/// Appends records to the durable log
///
/// `append` returns only once the record has reached the durability level
/// selected by the sync strategy. On failure the file is cut back to the end
/// of the last good record so a torn line can never prefix the next append.
pub struct LogWriter {
    path: PathBuf,
    file: File,
    sync_strategy: LogSyncStrategy,

    /// File length after the last successful append
    len: u64,

    /// Records appended through this writer since open/reopen
    records_appended: u64,
}

impl LogWriter {
    /// Open or create a log file for appending
    pub fn open(path: &Path, sync_strategy: LogSyncStrategy) -> Result<Self> {
        let file = Self::open_file(path)?;
        let len = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            sync_strategy,
            len,
            records_appended: 0,
        })
    }

    /// Append a record and make it durable
    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        let line = record.encode();

        if let Err(e) = self.write_line(&line) {
            tracing::error!("Log append to {} failed: {}", self.path.display(), e);
            // Best effort: drop whatever part of the line made it to the file
            if let Err(trim_err) = self.file.set_len(self.len) {
                tracing::error!("Could not trim torn log record: {}", trim_err);
            }
            return Err(SentinelError::LogWrite(e.to_string()));
        }

        self.len += line.len() as u64;
        self.records_appended += 1;
        Ok(())
    }

    /// Reopen the file at the same path
    ///
    /// Used after the file has been atomically replaced underneath this
    /// writer (compaction); the old handle points at the unlinked inode.
    pub fn reopen(&mut self) -> Result<()> {
        self.file = Self::open_file(&self.path)?;
        self.len = self.file.metadata()?.len();
        self.records_appended = 0;
        Ok(())
    }

    /// Records appended since open or the last reopen
    pub fn records_appended(&self) -> u64 {
        self.records_appended
    }

    /// Current length of the log in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn open_file(path: &Path) -> Result<File> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(file)
    }

    fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.file.write_all(line)?;
        self.file.flush()?;
        if self.sync_strategy == LogSyncStrategy::EveryWrite {
            self.file.sync_data()?;
        }
        Ok(())
    }
}
