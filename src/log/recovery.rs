//! Log Recovery
//!
//! Handles crash recovery by replaying the log.

use std::fs::OpenOptions;
use std::path::Path;

use crate::error::Result;
use super::{LogLine, LogReader, LogRecord};

/// Handles log recovery after a crash
pub struct LogRecovery;

/// Result of a recovery operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of records successfully recovered
    pub records_recovered: u64,

    /// Number of complete but unparseable lines skipped
    pub records_malformed: u64,

    /// Bytes of torn trailing record discarded
    pub bytes_discarded: u64,

    /// Length of the log up to the end of the last complete line
    pub valid_len: u64,

    /// Whether the file was truncated (torn tail removed)
    pub was_truncated: bool,
}

impl LogRecovery {
    /// Recover records from a log file
    ///
    /// This will:
    /// 1. Read all complete lines in order
    /// 2. Skip (and count) malformed lines
    /// 3. Truncate a torn record at the end
    /// 4. Return all valid records in append order
    ///
    /// A missing file recovers to nothing.
    pub fn recover(path: &Path) -> Result<(Vec<LogRecord>, RecoveryResult)> {
        if !path.exists() {
            return Ok((Vec::new(), RecoveryResult::default()));
        }

        let (records, mut result) = Self::scan(path, true)?;

        if result.bytes_discarded > 0 {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(result.valid_len)?;
            file.sync_all()?;
            result.was_truncated = true;

            tracing::warn!(
                "Discarded {} bytes of incomplete record at end of {}",
                result.bytes_discarded,
                path.display()
            );
        }

        Ok((records, result))
    }

    /// Verify integrity of a log file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        if !path.exists() {
            return Ok(RecoveryResult::default());
        }
        let (_, result) = Self::scan(path, false)?;
        Ok(result)
    }

    fn scan(path: &Path, collect: bool) -> Result<(Vec<LogRecord>, RecoveryResult)> {
        let mut reader = LogReader::open(path)?;
        let mut records = Vec::new();
        let mut result = RecoveryResult::default();

        while let Some(line) = reader.next_line()? {
            match line {
                LogLine::Record(record) => {
                    result.records_recovered += 1;
                    if collect {
                        records.push(record);
                    }
                }
                LogLine::Malformed { offset, line } => {
                    result.records_malformed += 1;
                    tracing::warn!(
                        "Skipping malformed log record at offset {}: {:?}",
                        offset,
                        String::from_utf8_lossy(&line)
                    );
                }
                LogLine::Incomplete { len, .. } => {
                    result.bytes_discarded = len;
                }
            }
            if result.bytes_discarded == 0 {
                result.valid_len = reader.position();
            }
        }

        Ok((records, result))
    }
}
