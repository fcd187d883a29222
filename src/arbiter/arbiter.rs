//! Blocking Entry/Exit Protocol
//!
//! `Arbitrator` serializes every state transition behind a single `parking_lot::Mutex`
//! and parks waiters on one condition variable per role. The lock is only held for the
//! O(1) transitions; the critical section itself runs between `enter` and `exit` with the
//! lock released.

use super::policy::{ArbitrationState, Wakeups};
use super::types::{ArbiterConfig, ArbiterSnapshot, Role};

use parking_lot::{Condvar, Mutex};

pub struct Arbitrator {
    state: Mutex<ArbitrationState>,
    readers_can_enter: Condvar,
    writers_can_enter: Condvar,
}

impl Arbitrator {
    pub fn new(config: ArbiterConfig) -> Self {
        tracing::info!(
            "Arbitrator ready (priority={}, ratio={})",
            config.mode,
            config.ratio
        );

        Self {
            state: Mutex::new(ArbitrationState::new(config)),
            readers_can_enter: Condvar::new(),
            writers_can_enter: Condvar::new(),
        }
    }

    /// Blocks until `role` may enter the critical section, then records the entry.
    ///
    /// Every call must be matched by exactly one `exit` with the same role. Prefer
    /// [`Arbitrator::access`], which does the pairing automatically.
    pub fn enter(&self, role: Role) {
        let mut state = self.state.lock();

        match role {
            Role::Reader => {
                while state.reader_must_wait() {
                    state.park_reader();
                    tracing::trace!("Reader parked");
                    self.readers_can_enter.wait(&mut state);
                    state.unpark_reader();
                }
                state.admit_reader();
            }
            Role::Writer => {
                state.queue_writer();
                while state.writer_must_wait() {
                    tracing::trace!("Writer parked");
                    self.writers_can_enter.wait(&mut state);
                }
                state.admit_writer();
            }
        }
    }

    /// Releases a hold taken by `enter` and wakes whichever class may now proceed.
    pub fn exit(&self, role: Role) {
        let mut state = self.state.lock();

        let wakeups = match role {
            Role::Reader => state.release_reader(),
            Role::Writer => state.release_writer(),
        };

        self.notify(wakeups);
    }

    /// Enters as `role` and returns a guard that exits when dropped.
    pub fn access(&self, role: Role) -> Access<'_> {
        self.enter(role);
        Access {
            arbiter: self,
            role,
        }
    }

    pub fn snapshot(&self) -> ArbiterSnapshot {
        self.state.lock().snapshot()
    }

    pub fn config(&self) -> ArbiterConfig {
        self.state.lock().config()
    }

    /// Wakes every parked reader and writer. Each re-evaluates its own predicate, so this
    /// never admits anyone the policy would refuse.
    pub fn wake_all(&self) {
        let _state = self.state.lock();
        self.readers_can_enter.notify_all();
        self.writers_can_enter.notify_all();
    }

    fn notify(&self, wakeups: Wakeups) {
        if wakeups.writer {
            self.writers_can_enter.notify_one();
        }
        if wakeups.readers {
            self.readers_can_enter.notify_all();
        }
    }
}

/// Hold on the critical section. Dropping it performs the matching `exit`, including
/// during unwinding.
#[must_use = "dropping the guard immediately leaves the critical section"]
pub struct Access<'a> {
    arbiter: &'a Arbitrator,
    role: Role,
}

impl Access<'_> {
    pub fn role(&self) -> Role {
        self.role
    }
}

impl Drop for Access<'_> {
    fn drop(&mut self) {
        self.arbiter.exit(self.role);
    }
}
