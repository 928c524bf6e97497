//! Screenlog Frame Store
//!
//! A flat directory of encoded frames. The store owns the files between
//! capture and cleanup; compilation only reads them.
//!
//! Only one session may use a directory at a time. Nothing enforces this:
//! two concurrent sessions interleave sequence numbers and corrupt grouping.

pub mod store;

pub use store::*;
