//! Shared Counter Storage Module
//!
//! Owns the single integer guarded by the arbitrator and its durable last-value snapshot.
//!
//! ## Core Concepts
//! - **Authority**: The in-memory value is authoritative for the lifetime of the process.
//! - **Snapshot**: Every write rewrites one file with the decimal value (last value wins,
//!   no history, not crash-atomic).
//! - **Recovery**: At startup the file is read back; a missing or corrupt file counts as `0`.

pub mod snapshot;
pub mod store;

#[cfg(test)]
mod tests;
