//! Admission Gate
//!
//! Caps how many connection handlers run at once, independent of their role. Built on a
//! `tokio::sync::Semaphore`; a permit is held for the whole life of a handler and handed
//! back when the `AdmissionPermit` is dropped, whichever way the handler ends.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("no handler slot became free within {0:?}")]
    Timeout(Duration),
    #[error("admission gate is closed")]
    Closed,
}

#[derive(Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
    rejected: Arc<AtomicU64>,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
            rejected: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Waits up to `timeout` for a free slot.
    ///
    /// # Returns
    /// * `Ok(permit)` once a slot is reserved.
    /// * `Err(Timeout)` if no slot freed in time (counted as a rejection).
    /// * `Err(Closed)` once the gate has been closed for shutdown.
    pub async fn acquire(&self, timeout: Duration) -> Result<AdmissionPermit, AdmissionError> {
        match tokio::time::timeout(timeout, self.semaphore.clone().acquire_owned()).await {
            Ok(Ok(permit)) => Ok(self.track(permit)),
            Ok(Err(_)) => Err(AdmissionError::Closed),
            Err(_) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                Err(AdmissionError::Timeout(timeout))
            }
        }
    }

    /// Closes the gate. Every pending and future `acquire` fails with `Closed`; permits
    /// already handed out stay valid until dropped.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of permits ever held at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn rejected_total(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    fn track(&self, permit: OwnedSemaphorePermit) -> AdmissionPermit {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        AdmissionPermit {
            in_flight: self.in_flight.clone(),
            _permit: permit,
        }
    }
}

/// One reserved handler slot.
pub struct AdmissionPermit {
    in_flight: Arc<AtomicUsize>,
    // Dropped after `Drop::drop` runs, so the gauge is lowered before the slot is reusable.
    _permit: OwnedSemaphorePermit,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
