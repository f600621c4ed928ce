//! Stripbooth Common Utilities
//!
//! Shared infrastructure for all Stripbooth crates:
//! - Error types and result aliases
//! - Countdown timing for timed shots
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod countdown;
pub mod error;
pub mod logging;

pub use config::*;
pub use countdown::*;
pub use error::*;
