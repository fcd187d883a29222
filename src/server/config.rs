use crate::arbiter::types::{ArbiterConfig, PriorityMode};
use crate::storage::snapshot::DEFAULT_SNAPSHOT_FILE;

use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;

/// Maximum number of connection handlers in flight at once.
pub const DEFAULT_CAPACITY: usize = 600;
/// How long the acceptor waits for a free slot before dropping a connection.
pub const DEFAULT_ADMISSION_TIMEOUT: Duration = Duration::from_secs(1);
/// How long in-flight handlers get to finish once shutdown starts.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
pub const DEFAULT_MIN_HOLD: Duration = Duration::from_millis(75);
pub const DEFAULT_MAX_HOLD: Duration = Duration::from_millis(150);

/// Simulated work performed inside the critical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldTime {
    pub min: Duration,
    pub max: Duration,
}

impl HoldTime {
    pub fn new(min: Duration, max: Duration) -> Self {
        if max < min {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    /// No hold at all.
    pub fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    /// Picks a duration uniformly in `[min, max]`.
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }

    /// Blocks the calling thread for a sampled duration.
    pub fn pause(&self) {
        let hold = self.sample();
        if !hold.is_zero() {
            std::thread::sleep(hold);
        }
    }
}

impl Default for HoldTime {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_HOLD,
            max: DEFAULT_MAX_HOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub arbiter: ArbiterConfig,
    pub capacity: usize,
    pub admission_timeout: Duration,
    pub shutdown_grace: Duration,
    pub hold_time: HoldTime,
    /// Where the counter snapshot lives. `None` keeps the counter in memory only.
    pub snapshot_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn new(mode: PriorityMode, ratio: u32) -> Self {
        Self {
            arbiter: ArbiterConfig::new(mode, ratio),
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            arbiter: ArbiterConfig::default(),
            capacity: DEFAULT_CAPACITY,
            admission_timeout: DEFAULT_ADMISSION_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            hold_time: HoldTime::default(),
            snapshot_path: Some(PathBuf::from(DEFAULT_SNAPSHOT_FILE)),
        }
    }
}
