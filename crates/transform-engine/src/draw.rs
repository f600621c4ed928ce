//! Destination rectangles for the preview box and the output cells.
//!
//! The preview and the final composite both start from a cover fit of the
//! source into their box, multiply in the user's zoom, and place the
//! frame's top-left at the user's pan offset. The offset is recorded in
//! preview pixels, so for a cell it is rescaled per axis by the ratio of
//! cell size to preview size.

use stripbooth_common::error::StripboothResult;
use stripbooth_strip_model::geometry::{Dimensions, FitMode, Offset, Rect};
use stripbooth_strip_model::layout::CellLayout;
use stripbooth_strip_model::shot::ShotTransform;

use crate::fit::{ensure_valid, fit_base_scale};

/// Where to draw `source` inside the preview box.
pub fn preview_draw_rect(
    source: Dimensions,
    preview: Dimensions,
    transform: &ShotTransform,
) -> StripboothResult<Rect> {
    let effective = fit_base_scale(source, preview, FitMode::Cover)? * transform.scale;
    let size = source.scaled(effective);
    Ok(Rect::new(
        transform.offset.x,
        transform.offset.y,
        size.width,
        size.height,
    ))
}

/// Where to draw `source` on the output canvas for a shot placed in `cell`.
///
/// `preview` is the box the transform was confirmed in. Used identically
/// for every shot index.
pub fn cell_draw_rect(
    source: Dimensions,
    cell: &CellLayout,
    transform: &ShotTransform,
    preview: Dimensions,
) -> StripboothResult<Rect> {
    let cell_dims = cell.dimensions();
    let offset = rescale_offset(transform.offset, preview, cell_dims)?;
    let effective = fit_base_scale(source, cell_dims, FitMode::Cover)? * transform.scale;
    let size = source.scaled(effective);
    Ok(Rect::new(
        cell.x + offset.x,
        cell.y + offset.y,
        size.width,
        size.height,
    ))
}

/// Map a preview-space offset into a box of size `target`, per axis.
pub fn rescale_offset(
    offset: Offset,
    preview: Dimensions,
    target: Dimensions,
) -> StripboothResult<Offset> {
    ensure_valid(preview)?;
    ensure_valid(target)?;
    Ok(Offset::new(
        offset.x * target.width / preview.width,
        offset.y * target.height / preview.height,
    ))
}

/// Offset that centers the cover-fit, `scale`-zoomed source in the preview.
pub fn centered_offset(
    source: Dimensions,
    preview: Dimensions,
    scale: f64,
) -> StripboothResult<Offset> {
    let size = source.scaled(fit_base_scale(source, preview, FitMode::Cover)? * scale);
    Ok(Offset::new(
        (preview.width - size.width) / 2.0,
        (preview.height - size.height) / 2.0,
    ))
}
