//! Stripbooth Capture Engine
//!
//! Drives a photobooth session from the first countdown to the finished
//! strip. The session owns the ordered list of confirmed shots; camera
//! frames and overlay assets come from collaborators behind small
//! interfaces.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                       Session                         │
//! │  Idle ─▶ Countdown ─▶ Preview(i) ─┬─ confirm ─▶ ...   │
//! │              ▲                    │                   │
//! │              └────── retake ──────┘                   │
//! │                      last confirm ─▶ Compositing ─▶ Done
//! └──────┬──────────────────────┬────────────────────────┘
//!        │                      │
//!  ┌─────▼──────┐        ┌──────▼──────┐
//!  │CameraSource│        │ AssetLoader │  frames/<name>
//!  └────────────┘        └─────────────┘
//! ```

pub mod assets;
pub mod session;
pub mod source;

pub use assets::{AssetHandle, AssetLoader};
pub use session::*;
pub use source::{CameraSource, StillFrameSource, SyntheticSource, FRAME_EXTENSIONS};
