//! Stripbooth Render Engine
//!
//! Turns confirmed shots into pixels. Geometry comes exclusively from the
//! Transform Engine; this crate only resamples and blends.
//!
//! # Pipeline
//!
//! ```text
//! shot 0 ──┐
//! shot 1 ──┼── cell_draw_rect ── draw (clipped to cell) ──┐
//! shot 2 ──┘                                              │
//!                                                         ├── overlay (full canvas, once)
//! frames/<name> ──────────────────────────────────────────┘         │
//!                                                                   ▼
//!                                                              encode PNG
//!                                                                   │
//!                                            file / data URL / QR request URL
//! ```

pub mod compositor;
pub mod export;
pub mod preview;

pub use compositor::*;
pub use export::*;
pub use preview::*;
