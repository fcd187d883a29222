//! Counter Server Module
//!
//! The network-facing half of the system: accepts connections, bounds how many are in
//! flight, and runs each request through the arbitrator.
//!
//! ## Request Lifecycle
//! 1. **Admission**: The acceptor takes a permit from the `AdmissionGate` (bounded wait).
//! 2. **Decode**: The handler reads one fixed-size request frame.
//! 3. **Arbitration**: A dedicated OS thread enters the critical section, touches the
//!    counter, holds for a random time and exits.
//! 4. **Reply**: The response frame (with the measured wait latency) is written back and the
//!    connection closed. Dropping the permit returns it to the gate on every path.
//!
//! ## Submodules
//! - **`config`**: Server configuration and defaults.
//! - **`wire`**: Fixed-size binary request/response frames.
//! - **`gate`**: Bounded admission of concurrent handlers.
//! - **`handler`**: Per-connection unit of work.
//! - **`service`**: Accept loop and graceful shutdown.
//! - **`protocol`** / **`handlers`**: HTTP stats endpoints and their DTOs.

pub mod config;
pub mod gate;
pub mod handler;
pub mod handlers;
pub mod protocol;
pub mod service;
pub mod wire;
