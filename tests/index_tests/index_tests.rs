//! Tests for the cardinality index
//!
//! These tests verify:
//! - Initialization of a missing index file
//! - Persistence of every change
//! - Rejection of malformed index files

use std::fs;
use std::path::PathBuf;

use pnkc::index::CardinalityIndex;
use pnkc::{Bucket, StoreError, SyncStrategy};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_index_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(CardinalityIndex::FILENAME);
    (temp_dir, path)
}

fn bucket(symbol: char) -> Bucket {
    Bucket::from_symbol(symbol).unwrap()
}

fn full_index_json(overrides: &[(char, u64)]) -> String {
    let entries: Vec<String> = Bucket::all()
        .map(|b| {
            let count = overrides
                .iter()
                .find(|(s, _)| *s == b.symbol())
                .map_or(0, |(_, c)| *c);
            format!("\"{}\": {}", b.symbol(), count)
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}

// =============================================================================
// Load Tests
// =============================================================================

#[test]
fn test_load_missing_file_initializes_zeros() {
    let (_temp, path) = setup_temp_index_path();

    let index = CardinalityIndex::load(&path, SyncStrategy::EveryWrite).unwrap();

    assert!(path.exists());
    assert_eq!(index.total(), 0);
    assert!(index.iter().all(|(_, count)| count == 0));
    assert_eq!(index.iter().count(), Bucket::COUNT);
}

#[test]
fn test_initial_file_lists_every_bucket_in_order() {
    let (_temp, path) = setup_temp_index_path();

    CardinalityIndex::load(&path, SyncStrategy::EveryWrite).unwrap();
    let contents = fs::read_to_string(&path).unwrap();

    assert!(contents.starts_with("{\n    \"a\": 0,\n    \"b\": 0,"));
    assert!(contents.trim_end().ends_with("\"z\": 0,\n    \"#\": 0\n}"));
}

#[test]
fn test_load_existing_file() {
    let (_temp, path) = setup_temp_index_path();
    fs::write(&path, full_index_json(&[('a', 3), ('#', 1)])).unwrap();

    let index = CardinalityIndex::load(&path, SyncStrategy::EveryWrite).unwrap();

    assert_eq!(index.get(bucket('a')), 3);
    assert_eq!(index.get(Bucket::CATCH_ALL), 1);
    assert_eq!(index.total(), 4);
}

#[test]
fn test_load_rejects_invalid_json() {
    let (_temp, path) = setup_temp_index_path();
    fs::write(&path, "{not json").unwrap();

    let result = CardinalityIndex::load(&path, SyncStrategy::EveryWrite);

    assert!(matches!(result, Err(StoreError::Index(_))));
}

#[test]
fn test_load_rejects_negative_count() {
    let (_temp, path) = setup_temp_index_path();
    fs::write(&path, full_index_json(&[]).replace("\"c\": 0", "\"c\": -1")).unwrap();

    let result = CardinalityIndex::load(&path, SyncStrategy::EveryWrite);

    assert!(matches!(result, Err(StoreError::Index(_))));
}

#[test]
fn test_load_rejects_missing_bucket() {
    let (_temp, path) = setup_temp_index_path();
    fs::write(&path, "{\"a\": 0}").unwrap();

    let result = CardinalityIndex::load(&path, SyncStrategy::EveryWrite);

    assert!(matches!(result, Err(StoreError::Index(_))));
}

#[test]
fn test_load_rejects_unknown_bucket() {
    let (_temp, path) = setup_temp_index_path();
    let json = full_index_json(&[]).replace("}", ", \"ab\": 0}");
    fs::write(&path, json).unwrap();

    let result = CardinalityIndex::load(&path, SyncStrategy::EveryWrite);

    assert!(matches!(result, Err(StoreError::Index(_))));
}

// =============================================================================
// Set Tests
// =============================================================================

#[test]
fn test_set_persists_immediately() {
    let (_temp, path) = setup_temp_index_path();

    {
        let mut index = CardinalityIndex::load(&path, SyncStrategy::EveryWrite).unwrap();
        index.set(bucket('m'), 7).unwrap();
        index.set(Bucket::CATCH_ALL, 2).unwrap();
        assert_eq!(index.get(bucket('m')), 7);
    }

    let reloaded = CardinalityIndex::load(&path, SyncStrategy::OsBuffered).unwrap();
    assert_eq!(reloaded.get(bucket('m')), 7);
    assert_eq!(reloaded.get(Bucket::CATCH_ALL), 2);
    assert_eq!(reloaded.total(), 9);
}

#[test]
fn test_set_leaves_no_temporary_files() {
    let (temp, path) = setup_temp_index_path();
    let mut index = CardinalityIndex::load(&path, SyncStrategy::EveryWrite).unwrap();

    for n in 0..5 {
        index.set(bucket('q'), n).unwrap();
    }

    let names: Vec<String> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec![CardinalityIndex::FILENAME.to_string()]);
}

#[test]
fn test_set_failure_keeps_previous_value() {
    let (temp, path) = setup_temp_index_path();
    let mut index = CardinalityIndex::load(&path, SyncStrategy::EveryWrite).unwrap();
    index.set(bucket('b'), 4).unwrap();

    // Removing the directory makes the temporary file impossible to create
    drop(temp);

    assert!(index.set(bucket('b'), 5).is_err());
    assert_eq!(index.get(bucket('b')), 4);
}
