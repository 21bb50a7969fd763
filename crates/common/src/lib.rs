//! Birthcard Common Utilities
//!
//! Shared infrastructure for all Birthcard crates:
//! - Error types and result aliases
//! - Clock abstraction for timestamps and date seeding
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
