//! # Resilo - Maturity Assessment Server
//!
//! Library surface of the Resilo binary: the HTTP API, the CLI, and the
//! TOML configuration layer. Exposed as a library so integration tests
//! can drive the router without starting a real server.

pub mod api;
pub mod cli;
pub mod config;

/// Current time as epoch seconds.
///
/// The core store is deterministic and takes timestamps from its
/// caller; this is the single place the app reads the clock.
#[must_use]
pub fn unix_now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
