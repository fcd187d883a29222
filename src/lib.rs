//! Counter Arbiter Library
//!
//! A TCP service that guards one shared counter with a reader/writer arbitrator. Readers
//! share the critical section, writers own it, and a priority mode plus an optional
//! fairness ratio decide who goes next when both are waiting.
//!
//! ## Architecture Modules
//!
//! - **`arbiter`**: The admission policy and its blocking front end. Pure state machine in
//!   `policy`, condition-variable wrapper in `arbiter`.
//! - **`storage`**: The counter itself and its one-file durable snapshot.
//! - **`server`**: Binary wire protocol, bounded admission gate, per-connection handlers,
//!   the accept loop and a small HTTP stats surface.
//! - **`client`**: Load generator with retrying connections, used by the client binary.

pub mod arbiter;
pub mod client;
pub mod server;
pub mod storage;
