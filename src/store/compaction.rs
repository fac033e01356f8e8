//! Log Compaction
//!
//! Rewrites the durable log to hold exactly one `SET` record per live key.
//!
//! ## Procedure
//! 1. Write every live entry to `data.log.tmp` and fsync it
//! 2. Rename the scratch file over `data.log` (atomic replace)
//! 3. Fsync the directory so the rename itself is durable
//! 4. Reopen the log writer on the new file
//!
//! Until step 2 completes the old log is untouched, so a crash or error at
//! any earlier point leaves recovery exactly where it was.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, SentinelError};
use crate::log::LogRecord;

use super::Store;

/// Outcome of a compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionStats {
    /// Records in the log before compaction
    pub records_before: u64,

    /// Records in the log after compaction (= live keys)
    pub records_after: u64,

    /// Log size in bytes before compaction
    pub bytes_before: u64,

    /// Log size in bytes after compaction
    pub bytes_after: u64,
}

/// Writes a minimal log and swaps it in
pub struct Compactor;

impl Compactor {
    /// Rewrite `log_path` from `entries`, going through `scratch_path`
    ///
    /// Returns the number of bytes in the new log. On error the scratch file
    /// is removed and `log_path` is left as it was.
    pub fn rewrite<'a, I>(entries: I, log_path: &Path, scratch_path: &Path) -> Result<u64>
    where
        I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
    {
        let written = match Self::write_scratch(entries, scratch_path) {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(scratch_path);
                return Err(SentinelError::Compaction(format!(
                    "writing {}: {}",
                    scratch_path.display(),
                    e
                )));
            }
        };

        if let Err(e) = fs::rename(scratch_path, log_path) {
            let _ = fs::remove_file(scratch_path);
            return Err(SentinelError::Compaction(format!(
                "replacing {}: {}",
                log_path.display(),
                e
            )));
        }

        sync_parent_dir(log_path);
        Ok(written)
    }

    fn write_scratch<'a, I>(entries: I, scratch_path: &Path) -> std::io::Result<u64>
    where
        I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
    {
        let mut out = BufWriter::new(File::create(scratch_path)?);
        let mut written = 0u64;

        for (key, value) in entries {
            let line = LogRecord::set(key, value).encode();
            out.write_all(&line)?;
            written += line.len() as u64;
        }

        let file = out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(written)
    }
}

impl Store {
    /// Compact the log (caller must hold exclusive access)
    ///
    /// Postcondition: replaying the new log yields exactly the current map,
    /// with one `SET` per live key and no `DEL` records.
    pub fn compact(&mut self) -> Result<CompactionStats> {
        let log_path = self.config.log_path();
        let scratch_path = self.config.compaction_path();

        let records_before = self.log_records;
        let bytes_before = self.log.len();

        let bytes_after = Compactor::rewrite(self.entries(), &log_path, &scratch_path)?;

        // The new file is in place; from here on the old handle must not be
        // written to, even if reopening fails now.
        self.log_records = self.table.len() as u64;
        self.needs_reopen = true;
        self.log.reopen().map_err(|e| {
            SentinelError::Compaction(format!("reopening {}: {}", log_path.display(), e))
        })?;
        self.needs_reopen = false;

        let stats = CompactionStats {
            records_before,
            records_after: self.log_records,
            bytes_before,
            bytes_after,
        };

        tracing::info!(
            "Log compacted: {} -> {} records, {} -> {} bytes",
            stats.records_before,
            stats.records_after,
            stats.bytes_before,
            stats.bytes_after
        );

        Ok(stats)
    }
}

/// Make a rename durable
#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    let Some(dir) = path.parent() else {
        return;
    };
    let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        tracing::warn!("Could not sync directory {}: {}", dir.display(), e);
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}
