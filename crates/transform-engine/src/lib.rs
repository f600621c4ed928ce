//! Stripbooth Transform Engine
//!
//! Maps a captured frame into the preview box and then into its cell on
//! the print-resolution strip, so that what the user framed in the small
//! preview is what lands, proportionally, in the final output:
//! - **Fit:** Contain/cover base scale of a source inside a box
//! - **Draw:** Preview and cell destination rectangles for a shot transform
//! - **Gesture:** Pan and pinch updates driven by pointer input
//!
//! This crate is pure computation. No I/O, no pixels, no hidden state.
//! Every call site (preview redraw, final composite) goes through the
//! same functions.

pub mod draw;
pub mod fit;
pub mod gesture;

pub use draw::{cell_draw_rect, centered_offset, preview_draw_rect, rescale_offset};
pub use fit::fit_base_scale;
pub use gesture::{pan_by, pinch_scale, GestureTracker, PointerEvent};
