//! Render one shot's preview box to a PNG file.

use std::path::PathBuf;

use stripbooth_capture::AssetLoader;
use stripbooth_common::config::AppConfig;
use stripbooth_render::export::{encode_png, load_rgba, save_png};
use stripbooth_render::preview::{overlay_cell_slice, render_preview};
use stripbooth_strip_model::geometry::{Dimensions, Offset};
use stripbooth_strip_model::shot::ShotTransform;
use stripbooth_transform::preview_draw_rect;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    config: &AppConfig,
    image: PathBuf,
    offset_x: f64,
    offset_y: f64,
    scale: f64,
    overlay: Option<String>,
    cell: usize,
    layout: Option<PathBuf>,
    output: PathBuf,
) -> anyhow::Result<()> {
    let layout = super::load_layout(layout)?;
    let frame = load_rgba(&image)?;
    let transform = ShotTransform::new(Offset::new(offset_x, offset_y), scale);

    let slice = match overlay {
        Some(name) => {
            let target = layout.cells.get(cell).ok_or_else(|| {
                anyhow::anyhow!("Layout has {} cells, no cell {cell}", layout.shot_count())
            })?;
            let mut assets = AssetLoader::new(&config.frames_dir);
            let handle = assets.request(&name)?;
            let overlay = assets.wait(handle).await?;
            Some(overlay_cell_slice(overlay, target, layout.output))
        }
        None => None,
    };

    let rendered = render_preview(&frame, layout.preview, &transform, slice.as_ref())?;
    let source = Dimensions::from_pixels(frame.width(), frame.height());
    let dest = preview_draw_rect(source, layout.preview, &transform)?;

    println!("Preview: {}x{}", layout.preview.width, layout.preview.height);
    println!(
        "  Frame drawn at ({:.1}, {:.1}) size {:.1}x{:.1} (scale {})",
        dest.x, dest.y, dest.width, dest.height, transform.scale
    );
    let path = save_png(&encode_png(&rendered)?, &output)?;
    println!("  Written to: {}", path.display());

    Ok(())
}
