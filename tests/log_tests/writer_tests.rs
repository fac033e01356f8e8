//! Tests for LogWriter
//!
//! These tests verify:
//! - Records are appended as one line each, in order
//! - Appends survive reopening the writer
//! - reopen() follows a file replaced underneath the writer
//! - A failed append is an error and is not counted

use std::fs;
use std::path::PathBuf;

use sentineldb::config::LogSyncStrategy;
use sentineldb::log::{LogReader, LogLine, LogRecord, LogWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("data.log");
    (temp_dir, log_path)
}

fn read_records(path: &PathBuf) -> Vec<LogRecord> {
    LogReader::open(path)
        .unwrap()
        .map(|line| match line.unwrap() {
            LogLine::Record(record) => record,
            other => panic!("unexpected line: {:?}", other),
        })
        .collect()
}

// =============================================================================
// Append Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (_temp, log_path) = setup_temp_log();

    let writer = LogWriter::open(&log_path, LogSyncStrategy::EveryWrite).unwrap();

    assert!(log_path.exists());
    assert!(writer.is_empty());
    assert_eq!(writer.records_appended(), 0);
}

#[test]
fn test_append_writes_text_lines() {
    let (_temp, log_path) = setup_temp_log();
    let mut writer = LogWriter::open(&log_path, LogSyncStrategy::EveryWrite).unwrap();

    writer.append(&LogRecord::set("user1", "alice")).unwrap();
    writer.append(&LogRecord::del("user1")).unwrap();

    let contents = fs::read_to_string(&log_path).unwrap();
    assert_eq!(contents, "SET user1 alice\nDEL user1\n");
    assert_eq!(writer.records_appended(), 2);
    assert_eq!(writer.len(), contents.len() as u64);
}

#[test]
fn test_append_preserves_order() {
    let (_temp, log_path) = setup_temp_log();
    let mut writer = LogWriter::open(&log_path, LogSyncStrategy::OsBuffered).unwrap();

    let records: Vec<_> = (0..50)
        .map(|i| {
            if i % 7 == 0 {
                LogRecord::del(format!("key{}", i / 2))
            } else {
                LogRecord::set(format!("key{}", i), format!("value{}", i))
            }
        })
        .collect();
    for record in &records {
        writer.append(record).unwrap();
    }

    assert_eq!(read_records(&log_path), records);
}

#[test]
fn test_reopen_appends_after_existing_records() {
    let (_temp, log_path) = setup_temp_log();

    {
        let mut writer = LogWriter::open(&log_path, LogSyncStrategy::EveryWrite).unwrap();
        writer.append(&LogRecord::set("a", "1")).unwrap();
    }

    let mut writer = LogWriter::open(&log_path, LogSyncStrategy::EveryWrite).unwrap();
    assert_eq!(writer.len(), "SET a 1\n".len() as u64);
    writer.append(&LogRecord::set("b", "2")).unwrap();

    assert_eq!(
        read_records(&log_path),
        vec![LogRecord::set("a", "1"), LogRecord::set("b", "2")]
    );
}

#[test]
fn test_reopen_follows_replaced_file() {
    let (temp, log_path) = setup_temp_log();
    let mut writer = LogWriter::open(&log_path, LogSyncStrategy::EveryWrite).unwrap();
    writer.append(&LogRecord::set("old", "1")).unwrap();

    let replacement = temp.path().join("replacement");
    fs::write(&replacement, "SET new 2\n").unwrap();
    fs::rename(&replacement, &log_path).unwrap();

    writer.reopen().unwrap();
    writer.append(&LogRecord::set("after", "3")).unwrap();

    assert_eq!(
        read_records(&log_path),
        vec![LogRecord::set("new", "2"), LogRecord::set("after", "3")]
    );
    assert_eq!(writer.records_appended(), 1);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[cfg(target_os = "linux")]
#[test]
fn test_append_to_full_device_fails() {
    // Every write to /dev/full fails with ENOSPC
    let full = std::path::Path::new("/dev/full");
    if !full.exists() {
        return;
    }

    let mut writer = LogWriter::open(full, LogSyncStrategy::EveryWrite).unwrap();
    let err = writer.append(&LogRecord::set("a", "1")).unwrap_err();

    assert!(err.is_durability());
    assert_eq!(writer.records_appended(), 0);
    assert_eq!(writer.len(), 0);
}
