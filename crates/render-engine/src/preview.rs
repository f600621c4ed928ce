//! Preview box rendering.
//!
//! Redrawn on every pointer move while the user frames a shot, so it is a
//! single clipped draw of the still frame plus an optional slice of the
//! overlay that will surround this shot's cell.

use image::imageops;
use image::RgbaImage;

use stripbooth_common::error::StripboothResult;
use stripbooth_strip_model::geometry::{Dimensions, Rect};
use stripbooth_strip_model::layout::CellLayout;
use stripbooth_strip_model::shot::ShotTransform;
use stripbooth_transform::preview_draw_rect;

use crate::compositor::{Canvas, RgbaCanvas};

/// Render `frame` into a preview box of size `preview` under `transform`.
pub fn render_preview(
    frame: &RgbaImage,
    preview: Dimensions,
    transform: &ShotTransform,
    overlay_slice: Option<&RgbaImage>,
) -> StripboothResult<RgbaImage> {
    let source = Dimensions::from_pixels(frame.width(), frame.height());
    let dest = preview_draw_rect(source, preview, transform)?;

    let mut canvas = RgbaCanvas::with_dimensions(preview)?;
    canvas.draw_image(frame, dest, None)?;
    if let Some(slice) = overlay_slice {
        canvas.draw_image(slice, Rect::from_dimensions(canvas.dimensions()), None)?;
    }
    Ok(canvas.into_image())
}

/// The part of a full-strip overlay that covers `cell`.
///
/// `output` is the canvas the cell is laid out on. An overlay of another
/// size is sampled proportionally.
pub fn overlay_cell_slice(overlay: &RgbaImage, cell: &CellLayout, output: Dimensions) -> RgbaImage {
    let kx = overlay.width() as f64 / output.width;
    let ky = overlay.height() as f64 / output.height;

    let x = ((cell.x * kx).round().max(0.0) as u32).min(overlay.width().saturating_sub(1));
    let y = ((cell.y * ky).round().max(0.0) as u32).min(overlay.height().saturating_sub(1));
    let w = ((cell.width * kx).round().max(1.0) as u32).min(overlay.width() - x);
    let h = ((cell.height * ky).round().max(1.0) as u32).min(overlay.height() - y);

    imageops::crop_imm(overlay, x, y, w, h).to_image()
}
