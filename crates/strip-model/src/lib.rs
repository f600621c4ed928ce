//! Stripbooth Strip Model
//!
//! Defines the core data contracts for photostrips:
//! - **Geometry:** Dimensions, offsets, pointer points, and draw rectangles
//! - **Shot:** The pan/zoom transform a user confirmed for one shot
//! - **Layout:** Output canvas, preview box, and per-shot cell placement
//! - **Manifest:** Saved snapshots plus transforms, for offline recompositing
//!
//! Coordinates are in pixels of whichever space a value belongs to:
//! offsets live in preview-box space, cells live in output-canvas space.

pub mod geometry;
pub mod layout;
pub mod manifest;
pub mod shot;

pub use geometry::*;
pub use layout::*;
pub use manifest::*;
pub use shot::*;
