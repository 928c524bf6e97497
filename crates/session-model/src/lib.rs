//! Screenlog Session Model
//!
//! Defines the data contracts shared by capture and compilation:
//! - **Config:** the immutable per-session [`CaptureConfig`]
//! - **Frame:** monitor tags and the on-disk frame filename scheme
//! - **Artifact:** compiled report videos and archives, and their names
//!
//! Frame filenames are the only record of a frame's sequence, monitor, and
//! capture time, so the naming scheme here is the contract between the
//! capture side and the compilation side.

pub mod artifact;
pub mod config;
pub mod frame;

pub use artifact::*;
pub use config::*;
pub use frame::*;
