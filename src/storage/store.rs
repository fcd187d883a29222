//! Counter Store
//!
//! The store does no access control of its own beyond a short internal lock: callers are
//! expected to reach it only from inside the arbitrated critical section, so writes are
//! already exclusive and reads never observe a write in progress.

use super::snapshot::SnapshotFile;

use parking_lot::Mutex;
use std::path::Path;

pub struct CounterStore {
    value: Mutex<u32>,
    snapshot: Option<SnapshotFile>,
}

impl CounterStore {
    /// Opens a store backed by the snapshot at `path`, recovering its last value.
    ///
    /// A missing file is created holding `0`; an unreadable or corrupt one is logged and
    /// treated as `0`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let snapshot = SnapshotFile::new(path.as_ref());

        let value = match snapshot.load() {
            Ok(Some(value)) => {
                tracing::info!(
                    "Recovered counter {} from {}",
                    value,
                    snapshot.path().display()
                );
                value
            }
            Ok(None) => {
                tracing::info!(
                    "No snapshot at {}, starting from 0",
                    snapshot.path().display()
                );
                if let Err(e) = snapshot.store(0) {
                    tracing::warn!(
                        "Failed to create snapshot {}: {}",
                        snapshot.path().display(),
                        e
                    );
                }
                0
            }
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable snapshot {}: {}",
                    snapshot.path().display(),
                    e
                );
                0
            }
        };

        Self {
            value: Mutex::new(value),
            snapshot: Some(snapshot),
        }
    }

    /// A store with no durable slot, starting at `initial`.
    pub fn in_memory(initial: u32) -> Self {
        Self {
            value: Mutex::new(initial),
            snapshot: None,
        }
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_ref().map(|snapshot| snapshot.path())
    }

    pub fn read(&self) -> u32 {
        *self.value.lock()
    }

    /// Increments the counter by one, persists it and returns the new value.
    ///
    /// A failed persist is logged and otherwise ignored.
    pub fn write(&self) -> u32 {
        let mut value = self.value.lock();
        *value = value.wrapping_add(1);

        if let Some(snapshot) = &self.snapshot {
            if let Err(e) = snapshot.store(*value) {
                tracing::warn!(
                    "Failed to persist counter {} to {}: {}",
                    *value,
                    snapshot.path().display(),
                    e
                );
            }
        }

        *value
    }
}
