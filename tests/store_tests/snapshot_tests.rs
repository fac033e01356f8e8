//! Tests for snapshot export
//!
//! These tests verify:
//! - The export holds one `key value` line per live key
//! - Exporting leaves the log and the map untouched
//! - The export is never used for recovery

use std::collections::HashMap;
use std::fs;

use sentineldb::Store;
use tempfile::TempDir;

use crate::common::{setup_temp_store, test_config};

fn parse_snapshot(bytes: &[u8]) -> HashMap<String, String> {
    String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .map(|line| {
            let (k, v) = line.split_once(' ').unwrap();
            (k.to_string(), v.to_string())
        })
        .collect()
}

#[test]
fn test_save_writes_every_live_key() {
    let (_temp, mut store) = setup_temp_store();
    store.set(b"a", b"1").unwrap();
    store.set(b"b", b"2").unwrap();
    store.set(b"c", b"").unwrap();
    store.set(b"d", b"4").unwrap();
    store.delete(b"d").unwrap();

    let stats = store.save().unwrap();

    let snapshot = parse_snapshot(&fs::read(store.config().snapshot_path()).unwrap());
    assert_eq!(stats.entries, 3);
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot["a"], "1");
    assert_eq!(snapshot["b"], "2");
    assert_eq!(snapshot["c"], "");
}

#[test]
fn test_save_does_not_touch_log() {
    let (_temp, mut store) = setup_temp_store();
    store.set(b"a", b"1").unwrap();
    store.set(b"a", b"2").unwrap();
    let log_before = fs::read(store.config().log_path()).unwrap();

    store.save().unwrap();
    store.save().unwrap();

    assert_eq!(fs::read(store.config().log_path()).unwrap(), log_before);
    assert_eq!(store.log_records(), 2);
    assert!(!store.config().data_dir.join("snapshot.db.tmp").exists());
}

#[test]
fn test_save_replaces_previous_export() {
    let (_temp, mut store) = setup_temp_store();
    store.set(b"old", b"x").unwrap();
    store.save().unwrap();

    store.delete(b"old").unwrap();
    store.set(b"new", b"y").unwrap();
    store.save().unwrap();

    let snapshot = parse_snapshot(&fs::read(store.config().snapshot_path()).unwrap());
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot["new"], "y");
}

#[test]
fn test_snapshot_is_not_a_recovery_source() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path());

    {
        let mut store = Store::open(config.clone()).unwrap();
        store.set(b"a", b"1").unwrap();
        store.save().unwrap();
    }
    fs::write(config.snapshot_path(), b"planted value\n").unwrap();

    let store = Store::open(config).unwrap();
    assert_eq!(store.get(b"planted"), None);
    assert_eq!(store.get(b"a"), Some(&b"1"[..]));
}
