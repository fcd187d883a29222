//! Reader/Writer Access Arbitration Module
//!
//! Decides when a request may enter the critical section guarding the shared counter.
//! Any number of readers may be inside at once, a writer is always alone.
//!
//! ## Policy
//! The arbitrator runs under one of two priority regimes:
//! 1. **Reader priority**: readers are admitted while no writer is active; writers wait
//!    until no reader is active or queued.
//! 2. **Writer priority**: readers step aside whenever a writer is active or queued.
//!
//! An optional **fairness ratio** `R` bounds how many consecutive admissions the favored
//! class may take while the other class is waiting. With `R = 0` the favored class can
//! starve the other one indefinitely.
//!
//! ## Submodules
//! - **`types`**: Roles, priority modes, configuration and snapshots.
//! - **`policy`**: The pure state machine (wait predicates and fairness bookkeeping).
//! - **`arbiter`**: The blocking `enter`/`exit` protocol built on a mutex and two condition variables.

pub mod arbiter;
pub mod policy;
pub mod types;
