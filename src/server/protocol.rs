//! Stats HTTP Protocol
//!
//! Endpoints and DTOs for the read-only HTTP surface that reports arbitration and
//! admission state. Counter traffic itself never goes through HTTP.

use crate::arbiter::types::ArbiterSnapshot;
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Full server snapshot: arbitration state, gate occupancy, handler totals.
pub const ENDPOINT_STATS: &str = "/stats";
/// Current counter value only.
pub const ENDPOINT_COUNTER: &str = "/counter";

// --- Data Transfer Objects ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub counter: u32,
    pub arbiter: ArbiterSnapshot,
    pub gate: GateStats,
    pub handlers: HandlerCounts,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateStats {
    pub capacity: usize,
    pub in_flight: usize,
    pub peak_in_flight: usize,
    /// Connections dropped because no slot freed within the admission timeout.
    pub rejected: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandlerCounts {
    pub accepted: u64,
    pub completed_reads: u64,
    pub completed_writes: u64,
    /// Handlers aborted by a transport error or a failed thread spawn.
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CounterResponse {
    pub counter: u32,
}
