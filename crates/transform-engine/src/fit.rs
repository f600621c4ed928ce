//! Base fit scale of a source inside a target box.

use stripbooth_common::error::{StripboothError, StripboothResult};
use stripbooth_strip_model::geometry::{Dimensions, FitMode};

/// Scale factor that fits `source` into `target`.
///
/// `Contain` keeps the whole source visible, `Cover` fills the whole box.
/// Fails with `InvalidDimension` when either box has a non-positive or
/// non-finite side; the caller must skip the draw.
pub fn fit_base_scale(
    source: Dimensions,
    target: Dimensions,
    mode: FitMode,
) -> StripboothResult<f64> {
    ensure_valid(source)?;
    ensure_valid(target)?;

    let sx = target.width / source.width;
    let sy = target.height / source.height;
    Ok(match mode {
        FitMode::Contain => sx.min(sy),
        FitMode::Cover => sx.max(sy),
    })
}

pub(crate) fn ensure_valid(dims: Dimensions) -> StripboothResult<()> {
    if dims.is_valid() {
        Ok(())
    } else {
        Err(StripboothError::invalid_dimension(dims.width, dims.height))
    }
}
