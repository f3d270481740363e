//! Tests for Store
//!
//! These tests verify:
//! - Basic get/put/delete through the façade
//! - Index updates on insert, update and delete
//! - The empty-bucket fast path
//! - Bootstrapping and reopening a data directory
//! - Verification and repair of index drift

use std::fs;

use pnkc::{Bucket, Config, Record, Store, StoreError, SyncStrategy};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .sync_strategy(SyncStrategy::EveryWrite)
        .build();
    let store = Store::open(config).unwrap();
    (temp_dir, store)
}

fn word(key: &str, meaning: &str) -> Record {
    Record::new(key, vec![meaning.to_string()], vec![])
}

fn bucket(symbol: char) -> Bucket {
    Bucket::from_symbol(symbol).unwrap()
}

fn keys_in_bucket(store: &Store, symbol: char) -> Vec<String> {
    fs::read_to_string(store.bucket_path(bucket(symbol)))
        .unwrap()
        .lines()
        .filter_map(|l| l.strip_prefix("WORD="))
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn test_scenario_insert_into_empty_store() {
    let (_temp, mut store) = setup_temp_store();
    let apple = Record::new(
        "apple",
        vec!["a fruit".to_string()],
        vec!["I ate an apple.".to_string()],
    );

    let inserted = store.put(&apple).unwrap();

    assert!(inserted);
    assert_eq!(store.count(bucket('a')), 1);
    assert_eq!(store.get("apple").unwrap(), Some(apple));
}

#[test]
fn test_scenario_insert_between_existing_keys() {
    let (_temp, mut store) = setup_temp_store();
    store.put(&word("apple", "1")).unwrap();
    store.put(&word("banana", "2")).unwrap();
    store.put(&word("azure", "3")).unwrap();

    assert!(store.put(&word("avocado", "4")).unwrap());

    assert_eq!(keys_in_bucket(&store, 'a'), vec!["apple", "avocado", "azure"]);
    assert_eq!(store.count(bucket('a')), 3);
    assert_eq!(keys_in_bucket(&store, 'b'), vec!["banana"]);
    assert_eq!(store.count(bucket('b')), 1);
}

#[test]
fn test_scenario_delete_last_record_short_circuits_get() {
    let (_temp, mut store) = setup_temp_store();
    store.put(&word("apple", "fruit")).unwrap();

    assert!(store.delete("apple").unwrap());

    let path = store.bucket_path(bucket('a'));
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    assert_eq!(store.count(bucket('a')), 0);

    // With the file gone, any read attempt would fail
    fs::remove_file(&path).unwrap();
    assert_eq!(store.get("apple").unwrap(), None);
    assert!(!store.delete("apple").unwrap());
}

#[test]
fn test_scenario_routing_through_store() {
    let (_temp, mut store) = setup_temp_store();

    store.put(&word("Zebra99", "striped")).unwrap();
    store.put(&word("123go", "start")).unwrap();

    assert_eq!(keys_in_bucket(&store, 'z'), vec!["Zebra99"]);
    assert_eq!(keys_in_bucket(&store, '#'), vec!["123go"]);
    assert_eq!(store.count(Bucket::CATCH_ALL), 1);
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_update_preserves_count() {
    let (_temp, mut store) = setup_temp_store();
    store.put(&word("cat", "old")).unwrap();
    store.put(&word("cow", "moo")).unwrap();

    let inserted = store.put(&word("cat", "new")).unwrap();

    assert!(!inserted);
    assert_eq!(store.count(bucket('c')), 2);
    assert_eq!(store.get("cat").unwrap(), Some(word("cat", "new")));
}

#[test]
fn test_get_nonexistent_key() {
    let (_temp, mut store) = setup_temp_store();
    store.put(&word("dog", "woof")).unwrap();

    assert_eq!(store.get("dot").unwrap(), None);
    assert_eq!(store.get("elk").unwrap(), None);
}

#[test]
fn test_delete_absent_key_leaves_store_unchanged() {
    let (_temp, mut store) = setup_temp_store();
    store.put(&word("fig", "fruit")).unwrap();
    let bucket_before = fs::read(store.bucket_path(bucket('f'))).unwrap();
    let index_before = fs::read(store.index_path()).unwrap();

    assert!(!store.delete("fog").unwrap());

    assert_eq!(fs::read(store.bucket_path(bucket('f'))).unwrap(), bucket_before);
    assert_eq!(fs::read(store.index_path()).unwrap(), index_before);
    assert_eq!(store.count(bucket('f')), 1);
}

#[test]
fn test_put_invalid_key_is_rejected() {
    let (_temp, mut store) = setup_temp_store();

    let result = store.put(&word("two\nlines", "x"));

    assert!(matches!(result, Err(StoreError::InvalidKey(_))));
    assert!(store.is_empty());
}

#[test]
#[should_panic]
fn test_get_empty_key_panics() {
    let (_temp, store) = setup_temp_store();
    let _ = store.get("");
}

#[test]
fn test_len_tracks_all_buckets() {
    let (_temp, mut store) = setup_temp_store();
    for key in ["ant", "bee", "cat", "ant", "9lives"] {
        store.put(&word(key, "x")).unwrap();
    }
    store.delete("bee").unwrap();

    assert_eq!(store.len(), 3);
    let nonzero: Vec<(char, u64)> = store
        .counts()
        .filter(|(_, c)| *c > 0)
        .map(|(b, c)| (b.symbol(), c))
        .collect();
    assert_eq!(nonzero, vec![('a', 1), ('c', 1), ('#', 1)]);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_open_creates_layout() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("dict");

    let store = Store::open_path(&data_dir).unwrap();

    assert!(data_dir.join("stat.txt").exists());
    assert!(data_dir.join("a.pnkc").exists());
    assert!(data_dir.join("#.pnkc").exists());
    assert_eq!(store.data_dir(), data_dir.as_path());
    assert!(store.is_empty());
}

#[test]
fn test_reopen_preserves_records_and_counts() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut store = Store::open_path(temp_dir.path()).unwrap();
        store.put(&word("hello", "greeting")).unwrap();
        store.put(&word("world", "earth")).unwrap();
        store.put(&word("hello", "hi")).unwrap();
    }

    let store = Store::open_path(temp_dir.path()).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("hello").unwrap(), Some(word("hello", "hi")));
    assert_eq!(store.get("world").unwrap(), Some(word("world", "earth")));
}

#[test]
fn test_open_removes_stray_temporary_files() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut store = Store::open_path(temp_dir.path()).unwrap();
        store.put(&word("kiwi", "bird")).unwrap();
    }
    let stray = temp_dir.path().join("~k.pnkc.abc123.tmp");
    fs::write(&stray, "WORD=half-written\n").unwrap();

    let store = Store::open_path(temp_dir.path()).unwrap();

    assert!(!stray.exists());
    assert_eq!(store.get("kiwi").unwrap(), Some(word("kiwi", "bird")));
}

#[test]
fn test_open_fails_on_corrupt_index() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("stat.txt"), "[1, 2, 3]").unwrap();

    let result = Store::open_path(temp_dir.path());

    assert!(matches!(result, Err(StoreError::Index(_))));
}

#[cfg(unix)]
#[test]
fn test_index_file_gets_default_mode() {
    use std::os::unix::fs::PermissionsExt;

    let (_temp, mut store) = setup_temp_store();
    let mode = |path: &std::path::Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
    let bucket_mode = mode(&store.bucket_path(bucket('a')));

    assert_eq!(mode(store.index_path()), bucket_mode);
    store.put(&word("apple", "fruit")).unwrap();
    assert_eq!(mode(store.index_path()), bucket_mode);
    assert_eq!(mode(&store.bucket_path(bucket('a'))), bucket_mode);
}

// =============================================================================
// Verify / Reindex Tests
// =============================================================================

#[test]
fn test_verify_clean_store() {
    let (_temp, mut store) = setup_temp_store();
    for key in ["one", "two", "three", "4"] {
        store.put(&word(key, "n")).unwrap();
    }
    store.delete("two").unwrap();

    assert!(store.verify().unwrap().is_empty());
}

#[test]
fn test_verify_and_reindex_repair_drift() {
    let (temp, mut store) = setup_temp_store();
    store.put(&word("pear", "fruit")).unwrap();
    drop(store);

    // A record appended behind the store's back
    let path = temp.path().join("p.pnkc");
    let mut contents = fs::read_to_string(&path).unwrap();
    contents.push_str("WORD=plum\nMEANINGS=['fruit']\nEXAMPLES=[]\n");
    fs::write(&path, contents).unwrap();

    let mut store = Store::open_path(temp.path()).unwrap();
    let mismatches = store.verify().unwrap();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].bucket, bucket('p'));
    assert_eq!(mismatches[0].indexed, 1);
    assert_eq!(mismatches[0].actual, 2);

    let repaired = store.reindex().unwrap();
    assert_eq!(repaired, mismatches);
    assert_eq!(store.count(bucket('p')), 2);
    assert!(store.verify().unwrap().is_empty());
}

#[test]
fn test_verify_on_open_repairs_index() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut store = Store::open_path(temp_dir.path()).unwrap();
        store.put(&word("quail", "bird")).unwrap();
    }
    fs::write(temp_dir.path().join("q.pnkc"), "").unwrap();

    let config = Config::builder()
        .data_dir(temp_dir.path())
        .verify_on_open(true)
        .build();
    let store = Store::open(config).unwrap();

    assert_eq!(store.count(bucket('q')), 0);
    assert_eq!(store.get("quail").unwrap(), None);
}

#[test]
fn test_verify_reports_corruption() {
    let (temp, store) = setup_temp_store();
    fs::write(temp.path().join("r.pnkc"), "WORD=rat\nnonsense\n").unwrap();

    assert!(matches!(store.verify(), Err(StoreError::Corrupted { .. })));
}
