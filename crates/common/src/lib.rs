//! Screenlog Common Utilities
//!
//! Shared infrastructure for all Screenlog crates:
//! - Error types and result aliases
//! - Capture clock (local vs UTC timestamps)
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
