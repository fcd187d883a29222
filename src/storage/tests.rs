//! Storage Module Tests
//!
//! Validates counter semantics and the single-slot snapshot.
//!
//! ## Test Scopes
//! - **CounterStore**: Increment-by-one writes and side-effect free reads.
//! - **Durability**: Values survive a reopen; missing or corrupt snapshots recover as 0.
//! - **Failure**: A snapshot that cannot be written never affects the in-memory value.

#[cfg(test)]
mod tests {
    use crate::storage::snapshot::SnapshotFile;
    use crate::storage::store::CounterStore;
    use std::fs;

    // ============================================================
    // COUNTER TESTS
    // ============================================================

    #[test]
    fn test_write_increments_by_exactly_one() {
        let store = CounterStore::in_memory(0);

        assert_eq!(store.write(), 1);
        assert_eq!(store.write(), 2);
        assert_eq!(store.read(), 2, "read observes the last write");
    }

    #[test]
    fn test_read_has_no_side_effect() {
        let store = CounterStore::in_memory(41);

        for _ in 0..5 {
            assert_eq!(store.read(), 41);
        }
        assert!(store.snapshot_path().is_none());
    }

    // ============================================================
    // DURABILITY TESTS
    // ============================================================

    #[test]
    fn test_counter_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter.txt");

        // ARRANGE: N writes against a fresh snapshot
        {
            let store = CounterStore::open(&path);
            for _ in 0..7 {
                store.write();
            }
        }

        // ACT: "restart"
        let store = CounterStore::open(&path);

        // ASSERT
        assert_eq!(store.read(), 7);
        assert_eq!(fs::read_to_string(&path).unwrap(), "7");
        assert_eq!(store.write(), 8);
    }

    #[test]
    fn test_missing_snapshot_is_created_with_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.txt");

        let store = CounterStore::open(&path);

        assert_eq!(store.read(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "0");
        assert_eq!(store.snapshot_path(), Some(path.as_path()));
    }

    #[test]
    fn test_corrupt_snapshot_recovers_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.txt");
        fs::write(&path, "not a number").unwrap();

        let store = CounterStore::open(&path);
        assert_eq!(store.read(), 0);

        // The next write repairs the slot
        assert_eq!(store.write(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "1");
    }

    #[test]
    fn test_snapshot_tolerates_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("newline.txt");
        fs::write(&path, "12\n").unwrap();

        assert_eq!(SnapshotFile::new(&path).load().unwrap(), Some(12));
    }

    #[test]
    fn test_persist_failure_keeps_memory_authoritative() {
        let dir = tempfile::tempdir().unwrap();
        // Parent directory does not exist, so every persist fails
        let path = dir.path().join("missing-dir").join("counter.txt");

        let store = CounterStore::open(&path);

        assert_eq!(store.write(), 1);
        assert_eq!(store.write(), 2);
        assert_eq!(store.read(), 2);
        assert!(!path.exists());
    }
}
