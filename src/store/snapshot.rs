//! Snapshot Export
//!
//! Dumps every live entry as `key value\n` to a file separate from the log.
//! The export is for operators (backup, inspection) and is never read back
//! by recovery.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, SentinelError};

use super::Store;

/// Outcome of a snapshot export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotStats {
    pub entries: usize,
    pub bytes: u64,
}

/// Writes snapshot files
pub struct SnapshotExporter;

impl SnapshotExporter {
    /// Export `entries` to `path`
    ///
    /// Written to `tmp` first and renamed into place, so readers of `path`
    /// only ever see a complete export.
    pub fn export<'a, I>(entries: I, path: &Path, tmp: &Path) -> Result<SnapshotStats>
    where
        I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
    {
        let stats = match Self::write_file(entries, tmp) {
            Ok(stats) => stats,
            Err(e) => {
                let _ = fs::remove_file(tmp);
                return Err(SentinelError::Snapshot(format!("writing {}: {}", tmp.display(), e)));
            }
        };

        fs::rename(tmp, path).map_err(|e| {
            let _ = fs::remove_file(tmp);
            SentinelError::Snapshot(format!("replacing {}: {}", path.display(), e))
        })?;

        Ok(stats)
    }

    fn write_file<'a, I>(entries: I, path: &Path) -> std::io::Result<SnapshotStats>
    where
        I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
    {
        let mut out = BufWriter::new(File::create(path)?);
        let mut stats = SnapshotStats { entries: 0, bytes: 0 };

        for (key, value) in entries {
            out.write_all(key)?;
            out.write_all(b" ")?;
            out.write_all(value)?;
            out.write_all(b"\n")?;
            stats.entries += 1;
            stats.bytes += (key.len() + value.len() + 2) as u64;
        }

        let file = out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(stats)
    }
}

impl Store {
    /// Export a snapshot to the configured snapshot path
    ///
    /// Does not touch the map or the log.
    pub fn save(&self) -> Result<SnapshotStats> {
        let path = self.config.snapshot_path();
        let scratch = self.config.snapshot_scratch_path();
        let stats = SnapshotExporter::export(self.entries(), &path, &scratch)?;

        tracing::debug!(
            "Snapshot saved to {}: {} entries, {} bytes",
            path.display(),
            stats.entries,
            stats.bytes
        );
        Ok(stats)
    }
}
