use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role a request plays inside the critical section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Reader,
    Writer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Reader => write!(f, "reader"),
            Role::Writer => write!(f, "writer"),
        }
    }
}

/// Which role is preferred when both readers and writers are waiting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PriorityMode {
    ReaderPriority,
    WriterPriority,
}

impl FromStr for PriorityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reader" => Ok(PriorityMode::ReaderPriority),
            "writer" => Ok(PriorityMode::WriterPriority),
            other => Err(format!(
                "unknown priority '{}', expected 'reader' or 'writer'",
                other
            )),
        }
    }
}

impl fmt::Display for PriorityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityMode::ReaderPriority => write!(f, "reader"),
            PriorityMode::WriterPriority => write!(f, "writer"),
        }
    }
}

/// Configuration fixed at server start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArbiterConfig {
    pub mode: PriorityMode,
    /// Maximum consecutive admissions of the favored class while the other class waits.
    /// `0` disables the bound.
    pub ratio: u32,
}

impl ArbiterConfig {
    pub fn new(mode: PriorityMode, ratio: u32) -> Self {
        Self { mode, ratio }
    }

    pub fn ratio_enabled(&self) -> bool {
        self.ratio > 0
    }
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            mode: PriorityMode::ReaderPriority,
            ratio: 0,
        }
    }
}

/// Point-in-time copy of the arbitration state.
///
/// Taken under the arbitration lock, so the fields are mutually consistent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArbiterSnapshot {
    pub mode: PriorityMode,
    pub ratio: u32,
    pub active_readers: u32,
    pub waiting_readers: u32,
    pub waiting_writers: u32,
    pub writer_active: bool,
    pub writers_since_last_reader: u32,
    pub readers_since_last_writer: u32,
    /// Total reader admissions since start.
    pub readers_admitted: u64,
    /// Total writer admissions since start.
    pub writers_admitted: u64,
}
