//! Photostrip compositor: draws every confirmed shot into its cell, then
//! the overlay frame on top.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use stripbooth_common::config::OverlayPolicy;
use stripbooth_common::error::{StripboothError, StripboothResult};
use stripbooth_strip_model::geometry::{Dimensions, Rect};
use stripbooth_strip_model::layout::CellLayout;
use stripbooth_strip_model::shot::ShotTransform;
use stripbooth_transform::cell_draw_rect;

use crate::export::encode_png;

/// A confirmed shot: a frozen still frame and the transform the user chose.
#[derive(Debug, Clone)]
pub struct Shot {
    pub frame: RgbaImage,
    pub transform: ShotTransform,
}

impl Shot {
    pub fn new(frame: RgbaImage, transform: ShotTransform) -> Self {
        Self { frame, transform }
    }

    /// Pixel size of the captured frame.
    pub fn source_dimensions(&self) -> Dimensions {
        Dimensions::from_pixels(self.frame.width(), self.frame.height())
    }
}

/// A drawing surface.
pub trait Canvas {
    /// Surface size in pixels.
    fn dimensions(&self) -> Dimensions;

    /// Draw `image` stretched over `dest`, showing only the part inside
    /// `clip` (and the canvas).
    fn draw_image(
        &mut self,
        image: &RgbaImage,
        dest: Rect,
        clip: Option<Rect>,
    ) -> StripboothResult<()>;
}

/// Canvas backed by an RGBA pixel buffer.
#[derive(Debug, Clone)]
pub struct RgbaCanvas {
    image: RgbaImage,
}

impl RgbaCanvas {
    /// Transparent canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])),
        }
    }

    /// Canvas sized to `dims`, rounded to whole pixels.
    pub fn with_dimensions(dims: Dimensions) -> StripboothResult<Self> {
        if !dims.is_valid() {
            return Err(StripboothError::invalid_dimension(dims.width, dims.height));
        }
        let (w, h) = dims.to_pixels();
        Ok(Self::new(w, h))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl Canvas for RgbaCanvas {
    fn dimensions(&self) -> Dimensions {
        Dimensions::from_pixels(self.image.width(), self.image.height())
    }

    fn draw_image(
        &mut self,
        image: &RgbaImage,
        dest: Rect,
        clip: Option<Rect>,
    ) -> StripboothResult<()> {
        if image.width() == 0 || image.height() == 0 {
            return Err(StripboothError::invalid_dimension(
                image.width() as f64,
                image.height() as f64,
            ));
        }
        if !dest.dimensions().is_valid() {
            return Err(StripboothError::invalid_dimension(dest.width, dest.height));
        }

        let bounds = Rect::from_dimensions(self.dimensions());
        let visible = match clip {
            Some(clip) => bounds.intersect(&clip),
            None => Some(bounds),
        }
        .and_then(|area| area.intersect(&dest));
        let Some(visible) = visible else {
            return Ok(());
        };

        // Snap the visible area to whole canvas pixels.
        let x0 = visible.x.round();
        let y0 = visible.y.round();
        let x1 = visible.right().round();
        let y1 = visible.bottom().round();
        if x1 <= x0 || y1 <= y0 {
            return Ok(());
        }

        // Only the source pixels that land in the visible area are
        // resampled, so a 20x zoom never builds a 20x buffer.
        let sx = image.width() as f64 / dest.width;
        let sy = image.height() as f64 / dest.height;
        let src_x0 = ((x0 - dest.x) * sx).floor().max(0.0) as u32;
        let src_y0 = ((y0 - dest.y) * sy).floor().max(0.0) as u32;
        let src_x0 = src_x0.min(image.width() - 1);
        let src_y0 = src_y0.min(image.height() - 1);
        let src_x1 = (((x1 - dest.x) * sx).ceil() as u32).clamp(src_x0 + 1, image.width());
        let src_y1 = (((y1 - dest.y) * sy).ceil() as u32).clamp(src_y0 + 1, image.height());

        // The crop covers whole source pixels, so it is resized to its own
        // footprint on the canvas and then trimmed to the visible area.
        let rx0 = (dest.x + src_x0 as f64 / sx).round();
        let ry0 = (dest.y + src_y0 as f64 / sy).round();
        let rx1 = (dest.x + src_x1 as f64 / sx).round().max(rx0 + 1.0);
        let ry1 = (dest.y + src_y1 as f64 / sy).round().max(ry0 + 1.0);

        let left = x0.max(rx0);
        let top = y0.max(ry0);
        let right = x1.min(rx1);
        let bottom = y1.min(ry1);
        if right <= left || bottom <= top {
            return Ok(());
        }

        let region =
            imageops::crop_imm(image, src_x0, src_y0, src_x1 - src_x0, src_y1 - src_y0).to_image();
        let scaled = imageops::resize(
            &region,
            (rx1 - rx0) as u32,
            (ry1 - ry0) as u32,
            FilterType::Triangle,
        );
        let trimmed = imageops::crop_imm(
            &scaled,
            (left - rx0) as u32,
            (top - ry0) as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        )
        .to_image();
        imageops::overlay(&mut self.image, &trimmed, left as i64, top as i64);
        Ok(())
    }
}

/// Composite shots and overlay onto an existing canvas.
///
/// All checks run before the first draw: a shot/cell count mismatch, an
/// invalid shot geometry, or an overlay rejected by `policy` leaves the
/// canvas untouched. Shots are drawn in order, each clipped to its cell;
/// the overlay is drawn last, exactly once, stretched over the canvas.
pub fn composite_onto<C: Canvas + ?Sized>(
    canvas: &mut C,
    shots: &[Shot],
    cells: &[CellLayout],
    preview: Dimensions,
    overlay: Option<&RgbaImage>,
    policy: OverlayPolicy,
) -> StripboothResult<()> {
    if shots.len() != cells.len() {
        return Err(StripboothError::LayoutMismatch {
            shots: shots.len(),
            cells: cells.len(),
        });
    }

    let output = canvas.dimensions();
    if let Some(overlay) = overlay {
        check_overlay(overlay, output, policy)?;
    }

    let plan = shots
        .iter()
        .zip(cells)
        .map(|(shot, cell)| {
            let dest = cell_draw_rect(shot.source_dimensions(), cell, &shot.transform, preview)?;
            if !dest.dimensions().is_valid() {
                return Err(StripboothError::invalid_dimension(dest.width, dest.height));
            }
            Ok((shot, dest, cell.rect()))
        })
        .collect::<StripboothResult<Vec<_>>>()?;

    for (index, (shot, dest, clip)) in plan.into_iter().enumerate() {
        tracing::debug!(
            index,
            x = dest.x,
            y = dest.y,
            width = dest.width,
            height = dest.height,
            "Drawing shot"
        );
        canvas.draw_image(&shot.frame, dest, Some(clip))?;
    }

    if let Some(overlay) = overlay {
        canvas.draw_image(overlay, Rect::from_dimensions(output), None)?;
    }

    Ok(())
}

/// Composite a full session into a fresh canvas of `output` size and
/// encode it as PNG.
pub fn composite_session(
    shots: &[Shot],
    cells: &[CellLayout],
    output: Dimensions,
    preview: Dimensions,
    overlay: Option<&RgbaImage>,
    policy: OverlayPolicy,
) -> StripboothResult<Vec<u8>> {
    let mut canvas = RgbaCanvas::with_dimensions(output)?;
    composite_onto(&mut canvas, shots, cells, preview, overlay, policy)?;

    tracing::info!(
        shots = shots.len(),
        width = canvas.image().width(),
        height = canvas.image().height(),
        overlay = overlay.is_some(),
        "Composited photostrip"
    );

    encode_png(canvas.image())
}

fn check_overlay(
    overlay: &RgbaImage,
    output: Dimensions,
    policy: OverlayPolicy,
) -> StripboothResult<()> {
    let (expected_width, expected_height) = output.to_pixels();
    if overlay.dimensions() == (expected_width, expected_height) {
        return Ok(());
    }

    match policy {
        OverlayPolicy::Strict => Err(StripboothError::AssetDimensionMismatch {
            expected_width,
            expected_height,
            actual_width: overlay.width(),
            actual_height: overlay.height(),
        }),
        OverlayPolicy::Stretch => {
            tracing::warn!(
                expected_width,
                expected_height,
                actual_width = overlay.width(),
                actual_height = overlay.height(),
                "Overlay size differs from canvas, stretching"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stripbooth_strip_model::geometry::Offset;
    use stripbooth_strip_model::layout::StripLayout;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    #[derive(Debug, Clone, PartialEq)]
    struct DrawCall {
        size: (u32, u32),
        dest: Rect,
        clip: Option<Rect>,
    }

    /// Records draw calls instead of touching pixels.
    struct RecordingCanvas {
        dims: Dimensions,
        calls: Vec<DrawCall>,
    }

    impl RecordingCanvas {
        fn new(width: f64, height: f64) -> Self {
            Self {
                dims: Dimensions::new(width, height),
                calls: vec![],
            }
        }
    }

    impl Canvas for RecordingCanvas {
        fn dimensions(&self) -> Dimensions {
            self.dims
        }

        fn draw_image(
            &mut self,
            image: &RgbaImage,
            dest: Rect,
            clip: Option<Rect>,
        ) -> StripboothResult<()> {
            self.calls.push(DrawCall {
                size: image.dimensions(),
                dest,
                clip,
            });
            Ok(())
        }
    }

    fn camera_shot(offset: Offset) -> Shot {
        Shot::new(
            RgbaImage::from_pixel(1920, 1080, RED),
            ShotTransform::new(offset, 1.0),
        )
    }

    #[test]
    fn test_canonical_strip_draw_order() {
        let layout = StripLayout::default();
        let shots = vec![camera_shot(Offset::ZERO); 3];
        let overlay = RgbaImage::new(1240, 3508);
        let mut canvas = RecordingCanvas::new(1240.0, 3508.0);

        composite_onto(
            &mut canvas,
            &shots,
            &layout.cells,
            layout.preview,
            Some(&overlay),
            OverlayPolicy::Strict,
        )
        .unwrap();

        assert_eq!(canvas.calls.len(), 4);
        let tops: Vec<f64> = canvas.calls[..3].iter().map(|c| c.dest.y).collect();
        assert_eq!(tops, vec![200.0, 1370.0, 2540.0]);
        for (call, cell) in canvas.calls[..3].iter().zip(&layout.cells) {
            assert_eq!(call.dest.x, 73.5);
            assert_eq!(call.clip, Some(cell.rect()));
            assert_eq!(call.size, (1920, 1080));
        }

        let last = &canvas.calls[3];
        assert_eq!(last.size, (1240, 3508));
        assert_eq!(last.dest, Rect::new(0.0, 0.0, 1240.0, 3508.0));
        assert_eq!(last.clip, None);
    }

    #[test]
    fn test_layout_mismatch_draws_nothing() {
        let layout = StripLayout::default();
        let shots = vec![camera_shot(Offset::ZERO); 2];
        let overlay = RgbaImage::new(1240, 3508);
        let mut canvas = RecordingCanvas::new(1240.0, 3508.0);

        let err = composite_onto(
            &mut canvas,
            &shots,
            &layout.cells,
            layout.preview,
            Some(&overlay),
            OverlayPolicy::Strict,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            StripboothError::LayoutMismatch { shots: 2, cells: 3 }
        ));
        assert!(canvas.calls.is_empty());
    }

    #[test]
    fn test_strict_overlay_mismatch_draws_nothing() {
        let layout = StripLayout::default();
        let shots = vec![camera_shot(Offset::ZERO); 3];
        let overlay = RgbaImage::new(620, 1754);
        let mut canvas = RecordingCanvas::new(1240.0, 3508.0);

        let err = composite_onto(
            &mut canvas,
            &shots,
            &layout.cells,
            layout.preview,
            Some(&overlay),
            OverlayPolicy::Strict,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            StripboothError::AssetDimensionMismatch {
                actual_width: 620,
                ..
            }
        ));
        assert!(canvas.calls.is_empty());
    }

    #[test]
    fn test_stretch_overlay_is_drawn_over_full_canvas() {
        let layout = StripLayout::default();
        let shots = vec![camera_shot(Offset::ZERO); 3];
        let overlay = RgbaImage::new(620, 1754);
        let mut canvas = RecordingCanvas::new(1240.0, 3508.0);

        composite_onto(
            &mut canvas,
            &shots,
            &layout.cells,
            layout.preview,
            Some(&overlay),
            OverlayPolicy::Stretch,
        )
        .unwrap();

        let last = canvas.calls.last().unwrap();
        assert_eq!(last.size, (620, 1754));
        assert_eq!(last.dest, Rect::new(0.0, 0.0, 1240.0, 3508.0));
    }

    #[test]
    fn test_invalid_shot_geometry_aborts_before_drawing() {
        let layout = StripLayout::default();
        let shots = vec![camera_shot(Offset::ZERO); 3];
        let mut canvas = RecordingCanvas::new(1240.0, 3508.0);

        let result = composite_onto(
            &mut canvas,
            &shots,
            &layout.cells,
            Dimensions::new(0.0, 500.0),
            None,
            OverlayPolicy::Strict,
        );

        assert!(matches!(
            result,
            Err(StripboothError::InvalidDimension { .. })
        ));
        assert!(canvas.calls.is_empty());
    }

    #[test]
    fn test_negative_scale_leaves_canvas_untouched() {
        let layout = StripLayout::stacked(
            Dimensions::new(124.0, 350.0),
            Dimensions::new(32.0, 50.0),
            Dimensions::new(109.0, 76.0),
            &[20.0, 137.0, 254.0],
        );
        let mut shots: Vec<Shot> = (0..3)
            .map(|_| Shot::new(RgbaImage::from_pixel(192, 108, RED), ShotTransform::IDENTITY))
            .collect();
        shots[2].transform = ShotTransform {
            offset: Offset::ZERO,
            scale: -1.0,
        };
        let mut canvas = RgbaCanvas::new(124, 350);

        let result = composite_onto(
            &mut canvas,
            &shots,
            &layout.cells,
            layout.preview,
            None,
            OverlayPolicy::Strict,
        );

        assert!(matches!(
            result,
            Err(StripboothError::InvalidDimension { .. })
        ));
        assert!(canvas.image().pixels().all(|p| *p == CLEAR));
    }

    #[test]
    fn test_zoomed_columns_land_where_the_draw_rect_puts_them() {
        // Four 10px-wide columns starting at x = -5: boundaries at 5, 15, 25.
        let source = RgbaImage::from_fn(4, 1, |x, _| Rgba([(x * 40) as u8, 0, 0, 255]));
        let mut canvas = RgbaCanvas::new(20, 10);
        canvas
            .draw_image(&source, Rect::new(-5.0, 0.0, 40.0, 10.0), None)
            .unwrap();

        let row: Vec<u8> = (0..20).map(|x| canvas.image().get_pixel(x, 5)[0]).collect();
        // Column 0/1 boundary sits between canvas pixels 4 and 5.
        assert!(row[4] < 20 && row[5] > 20, "row {row:?}");
        // Column 1 is centred on x = 10.
        assert!(row[9].abs_diff(40) <= 3, "row {row:?}");
        assert!(row[10].abs_diff(40) <= 3, "row {row:?}");
        // Column 2 is centred on x = 20, just past the canvas edge.
        assert!(row[19].abs_diff(80) <= 3, "row {row:?}");
    }

    #[test]
    fn test_draw_is_clipped_to_cell() {
        let mut canvas = RgbaCanvas::new(100, 100);
        let source = RgbaImage::from_pixel(10, 10, RED);
        let cell = Rect::new(20.0, 20.0, 30.0, 30.0);

        canvas
            .draw_image(&source, Rect::new(0.0, 0.0, 100.0, 100.0), Some(cell))
            .unwrap();

        let image = canvas.image();
        assert_eq!(*image.get_pixel(25, 25), RED);
        assert_eq!(*image.get_pixel(49, 49), RED);
        assert_eq!(*image.get_pixel(50, 50), CLEAR);
        assert_eq!(*image.get_pixel(19, 25), CLEAR);
    }

    #[test]
    fn test_draw_outside_canvas_is_a_no_op() {
        let mut canvas = RgbaCanvas::new(50, 50);
        let source = RgbaImage::from_pixel(10, 10, RED);
        canvas
            .draw_image(&source, Rect::new(500.0, 500.0, 10.0, 10.0), None)
            .unwrap();
        assert!(canvas.image().pixels().all(|p| *p == CLEAR));
    }

    #[test]
    fn test_composite_session_produces_png_of_output_size() {
        let layout = StripLayout::stacked(
            Dimensions::new(124.0, 350.0),
            Dimensions::new(32.0, 50.0),
            Dimensions::new(109.0, 76.0),
            &[20.0, 137.0, 254.0],
        );
        let shots: Vec<Shot> = (0..3)
            .map(|_| Shot::new(RgbaImage::from_pixel(192, 108, RED), ShotTransform::IDENTITY))
            .collect();
        let mut overlay = RgbaImage::from_pixel(124, 350, Rgba([255, 255, 255, 255]));
        for cell in &layout.cells {
            for y in cell.y as u32..(cell.y + cell.height) as u32 {
                for x in cell.x.ceil() as u32..(cell.x + cell.width) as u32 {
                    overlay.put_pixel(x, y, CLEAR);
                }
            }
        }

        let png = composite_session(
            &shots,
            &layout.cells,
            layout.output,
            layout.preview,
            Some(&overlay),
            OverlayPolicy::Strict,
        )
        .unwrap();

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (124, 350));
        // Frame border wins, photo shows through the windows.
        assert_eq!(*decoded.get_pixel(2, 2), Rgba([255, 255, 255, 255]));
        assert_eq!(*decoded.get_pixel(60, 60), RED);
        assert_eq!(*decoded.get_pixel(60, 300), RED);
    }
}
