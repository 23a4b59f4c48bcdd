//! Recovery behavior across store conditions.
//!
//! Exercises the full recovery path against real store directories: healthy
//! databases, directories with only loose segment files, and stores whose
//! lock is held by a live handle.

use std::fs;
use std::path::Path;

use rusty_leveldb::{Options, DB};
use tempfile::TempDir;

use tweeks_sync::store::{recover_store, ScriptMap};

const ID_A: &str = "550e8400-e29b-41d4-a716-446655440000";
const ID_B: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

fn script_body(tag: &str) -> String {
    format!(
        "// ==UserScript==\\n// @name {}\\n// ==/UserScript==\\nconsole.log('{}');",
        tag, tag
    )
}

fn stored_object(entries: &[(&str, &str)]) -> String {
    let fields: Vec<String> = entries
        .iter()
        .map(|(id, tag)| format!("\"{}\":\"{}\"", id, script_body(tag)))
        .collect();
    format!("{{{}}}", fields.join(","))
}

fn open_db(dir: &Path, create: bool) -> DB {
    let mut options = Options::default();
    options.create_if_missing = create;
    DB::open(dir, options).unwrap()
}

#[test]
fn test_structured_store_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut db = open_db(temp_dir.path(), true);
        db.put(
            b"scripts",
            stored_object(&[(ID_A, "Alpha"), (ID_B, "Beta")]).as_bytes(),
        )
        .unwrap();
        db.put(b"settings", br#"{"theme":"dark"}"#).unwrap();
        db.flush().unwrap();
    }

    let recovery = recover_store(temp_dir.path());
    assert!(!recovery.locked);
    assert_eq!(recovery.scripts.len(), 2);
    assert!(recovery.scripts[ID_A].contains("@name Alpha"));
    assert!(recovery.scripts[ID_B].contains("@name Beta"));
}

#[test]
fn test_locked_store_with_nothing_recoverable_sets_locked_flag() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut db = open_db(temp_dir.path(), true);
        db.put(b"settings", br#"{"theme":"dark"}"#).unwrap();
        db.flush().unwrap();
    }

    let _holder = open_db(temp_dir.path(), false);
    let recovery = recover_store(temp_dir.path());

    assert!(recovery.locked);
    assert!(recovery.scripts.is_empty());
}

#[test]
fn test_locked_store_still_yields_records_from_segments() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut db = open_db(temp_dir.path(), true);
        db.put(b"scripts", stored_object(&[(ID_A, "Alpha")]).as_bytes())
            .unwrap();
        db.flush().unwrap();
    }

    // The lock blocks the structured path but segment files stay readable
    let _holder = open_db(temp_dir.path(), false);
    let recovery = recover_store(temp_dir.path());

    assert!(recovery.locked);
    assert_eq!(recovery.scripts.len(), 1);
    assert!(recovery.scripts[ID_A].contains("@name Alpha"));
}

#[test]
fn test_loose_log_segment_without_database_structure() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("000042.log"),
        format!("\"{}\":\"{}\"", ID_A, script_body("Orphan")),
    )
    .unwrap();

    let recovery = recover_store(temp_dir.path());
    assert!(!recovery.locked);
    assert_eq!(recovery.scripts.len(), 1);
    assert_eq!(
        recovery.scripts[ID_A],
        "// ==UserScript==\n// @name Orphan\n// ==/UserScript==\nconsole.log('Orphan');"
    );
}

#[test]
fn test_table_segments_are_scanned_when_logs_are_empty() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("000001.log"), b"nothing useful").unwrap();
    fs::write(
        temp_dir.path().join("000002.ldb"),
        format!(
            "binary\x00junk\"{}\":\"{}\"more\x00junk",
            ID_B,
            script_body("Tabled")
        ),
    )
    .unwrap();

    let recovery = recover_store(temp_dir.path());
    assert_eq!(recovery.scripts.len(), 1);
    assert!(recovery.scripts[ID_B].contains("@name Tabled"));
}

#[test]
fn test_later_profile_wins_when_merging() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    fs::write(
        first.path().join("000001.log"),
        format!("\"{}\":\"{}\"", ID_A, script_body("Stale")),
    )
    .unwrap();
    fs::write(
        second.path().join("000001.log"),
        format!("\"{}\":\"{}\"", ID_A, script_body("Fresh")),
    )
    .unwrap();

    let mut merged = ScriptMap::new();
    merged.extend(recover_store(first.path()).scripts);
    merged.extend(recover_store(second.path()).scripts);

    assert_eq!(merged.len(), 1);
    assert!(merged[ID_A].contains("@name Fresh"));
}

#[test]
fn test_empty_directory_recovers_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let recovery = recover_store(temp_dir.path());
    assert!(recovery.scripts.is_empty());
    assert!(!recovery.locked);
}
