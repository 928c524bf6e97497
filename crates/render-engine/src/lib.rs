//! Screenlog Render Engine
//!
//! Offline compilation of stored frames into report artifacts.
//!
//! # Pipeline Architecture
//!
//! ```text
//! frame store ── group by monitor tag
//!                     │
//!                     ├── scan dimensions → target = per-axis max
//!                     │
//!                     ├── decode + normalize (scale | pad)
//!                     │
//!                     ├── encode at fixed fps, hold final frame
//!                     ▼
//!             report_{stamp}[_mN].mp4
//!
//! frame store ── sorted frames ── stored zip ── screenshots_{stamp}.zip
//! ```

pub mod archive;
pub mod compile;
pub mod encoder;
pub mod normalize;
pub mod video;

pub use compile::*;
pub use encoder::{EncoderFactory, FfmpegEncoderFactory, VideoEncoder};
