//! Screenlog Capture Engine
//!
//! Periodically grabs every display, stamps each frame with the capture
//! time, and writes it to the frame store. The session controller owns the
//! collect loop and hands the stored frames to the render engine when the
//! session stops.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              SessionController               │
//! │  ┌────────────────┐      ┌────────────────┐  │
//! │  │ CaptureEngine  │      │   StopHandle   │◄─┼── SIGINT / SIGTERM
//! │  │ DisplayBackend │      └────────────────┘  │
//! │  │ LabelFont      │                          │
//! │  └───────┬────────┘                          │
//! │          ▼                                   │
//! │  ┌────────────────┐      ┌────────────────┐  │
//! │  │  FrameStore    │─────►│    Compiler    │  │
//! │  │  0000_..jpg    │      │  report_*.mp4  │  │
//! │  └────────────────┘      └────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod engine;
pub mod glyphs;
pub mod label;
pub mod session;

pub use backend::{get_backend, DisplayBackend};
pub use engine::{CaptureEngine, CaptureOutcome, CapturedFrame};
pub use label::LabelFont;
pub use session::*;
