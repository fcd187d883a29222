//! Load Client Module
//!
//! Drives a counter server over the binary wire protocol: one TCP connection per request,
//! many requests in flight at once.
//!
//! ## Submodules
//! - **`retry`**: Connection establishment with bounded exponential backoff and jitter.
//! - **`client`**: Single requests and concurrent batches.

pub mod client;
pub mod retry;

#[cfg(test)]
mod tests;
