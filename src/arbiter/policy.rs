//! Arbitration State Machine
//!
//! Holds every counter the priority and ratio rules depend on, and evaluates the wait
//! predicates. Nothing here blocks: the `Arbitrator` owns the lock and the condition
//! variables and calls into this type while holding the lock.

use super::types::{ArbiterConfig, ArbiterSnapshot, PriorityMode};

/// Which parked classes an exit has made eligible to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wakeups {
    /// Broadcast to every parked reader.
    pub readers: bool,
    /// Signal a single parked writer.
    pub writer: bool,
}

#[derive(Debug)]
pub struct ArbitrationState {
    config: ArbiterConfig,
    active_readers: u32,
    waiting_readers: u32,
    waiting_writers: u32,
    writer_active: bool,
    writers_since_last_reader: u32,
    readers_since_last_writer: u32,
    readers_admitted: u64,
    writers_admitted: u64,
}

impl ArbitrationState {
    pub fn new(config: ArbiterConfig) -> Self {
        Self {
            config,
            active_readers: 0,
            waiting_readers: 0,
            waiting_writers: 0,
            writer_active: false,
            writers_since_last_reader: 0,
            readers_since_last_writer: 0,
            readers_admitted: 0,
            writers_admitted: 0,
        }
    }

    pub fn config(&self) -> ArbiterConfig {
        self.config
    }

    /// True while a reader arriving now (or re-checking after a wakeup) has to park.
    pub fn reader_must_wait(&self) -> bool {
        if self.writer_active {
            return true;
        }

        let ratio = self.config.ratio;
        match (self.config.mode, ratio) {
            (PriorityMode::WriterPriority, 0) => self.waiting_writers > 0,
            (PriorityMode::ReaderPriority, 0) => false,
            (PriorityMode::WriterPriority, _) => {
                self.waiting_writers > 0 && self.writers_since_last_reader < ratio
            }
            (PriorityMode::ReaderPriority, _) => {
                self.waiting_writers > 0 && self.readers_since_last_writer >= ratio
            }
        }
    }

    /// True while a queued writer has to keep waiting.
    pub fn writer_must_wait(&self) -> bool {
        if self.writer_active || self.active_readers > 0 {
            return true;
        }

        let ratio = self.config.ratio;
        match (self.config.mode, ratio) {
            (PriorityMode::WriterPriority, 0) => false,
            (PriorityMode::ReaderPriority, 0) => self.waiting_readers > 0,
            // Once the writers have used up their turns, the readers that waited through
            // them go next.
            (PriorityMode::WriterPriority, _) => {
                self.waiting_readers > 0 && self.writers_since_last_reader >= ratio
            }
            (PriorityMode::ReaderPriority, _) => {
                self.waiting_readers > 0 && self.readers_since_last_writer < ratio
            }
        }
    }

    /// A reader is about to park on its condition.
    pub fn park_reader(&mut self) {
        self.waiting_readers += 1;
    }

    /// A parked reader woke up and holds the lock again.
    pub fn unpark_reader(&mut self) {
        debug_assert!(self.waiting_readers > 0);
        self.waiting_readers = self.waiting_readers.saturating_sub(1);
    }

    /// A writer arrived. It stays counted as waiting until admitted.
    pub fn queue_writer(&mut self) {
        self.waiting_writers += 1;
    }

    pub fn admit_reader(&mut self) {
        debug_assert!(!self.writer_active, "reader admitted while a writer is active");

        if self.config.ratio_enabled() {
            match self.config.mode {
                PriorityMode::WriterPriority => self.writers_since_last_reader = 0,
                PriorityMode::ReaderPriority => self.readers_since_last_writer += 1,
            }
        }

        self.active_readers += 1;
        self.readers_admitted += 1;
    }

    pub fn admit_writer(&mut self) {
        debug_assert!(!self.writer_active, "two writers admitted");
        debug_assert_eq!(self.active_readers, 0, "writer admitted over readers");
        debug_assert!(self.waiting_writers > 0);

        self.waiting_writers = self.waiting_writers.saturating_sub(1);
        self.writer_active = true;
        self.writers_admitted += 1;
    }

    pub fn release_reader(&mut self) -> Wakeups {
        debug_assert!(self.active_readers > 0, "reader exit without entry");
        self.active_readers = self.active_readers.saturating_sub(1);
        self.wakeups()
    }

    pub fn release_writer(&mut self) -> Wakeups {
        debug_assert!(self.writer_active, "writer exit without entry");
        self.writer_active = false;

        if self.config.ratio_enabled() {
            match self.config.mode {
                PriorityMode::WriterPriority => self.writers_since_last_reader += 1,
                PriorityMode::ReaderPriority => self.readers_since_last_writer = 0,
            }
        }

        self.wakeups()
    }

    /// Classes that are parked and whose predicate no longer holds.
    ///
    /// The predicates never let both classes through at once while both are queued, so at
    /// most one class is woken per exit.
    pub fn wakeups(&self) -> Wakeups {
        Wakeups {
            readers: self.waiting_readers > 0 && !self.reader_must_wait(),
            writer: self.waiting_writers > 0 && !self.writer_must_wait(),
        }
    }

    pub fn snapshot(&self) -> ArbiterSnapshot {
        ArbiterSnapshot {
            mode: self.config.mode,
            ratio: self.config.ratio,
            active_readers: self.active_readers,
            waiting_readers: self.waiting_readers,
            waiting_writers: self.waiting_writers,
            writer_active: self.writer_active,
            writers_since_last_reader: self.writers_since_last_reader,
            readers_since_last_writer: self.readers_since_last_writer,
            readers_admitted: self.readers_admitted,
            writers_admitted: self.writers_admitted,
        }
    }
}
