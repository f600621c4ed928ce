//! Run a photobooth session end to end.

use std::path::PathBuf;

use stripbooth_capture::{
    AssetLoader, CameraSource, ConfirmOutcome, Session, SessionConfig, StillFrameSource,
    SyntheticSource, TickOutcome,
};
use stripbooth_common::config::AppConfig;
use stripbooth_common::countdown::Countdown;
use stripbooth_render::export::{default_output_name, deliver, Delivery, OutputTarget};
use stripbooth_strip_model::geometry::Point;
use stripbooth_transform::PointerEvent;

/// Synthetic camera resolution.
const SYNTHETIC_WIDTH: u32 = 1280;
const SYNTHETIC_HEIGHT: u32 = 720;

/// Reference finger distance for scripted zooms.
const PINCH_BASE: f64 = 100.0;

pub struct RunOptions {
    pub stills: Option<PathBuf>,
    pub synthetic: bool,
    pub overlay: Option<String>,
    pub pans: Vec<(f64, f64)>,
    pub zooms: Vec<f64>,
    pub wait: bool,
    pub layout: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Parse a `DX,DY` pan argument.
pub fn parse_pan(value: &str) -> Result<(f64, f64), String> {
    let (dx, dy) = value
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got {value:?}"))?;
    let dx = dx
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid DX {dx:?}: {e}"))?;
    let dy = dy
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid DY {dy:?}: {e}"))?;
    Ok((dx, dy))
}

pub async fn run(config: &AppConfig, options: RunOptions) -> anyhow::Result<()> {
    let layout = super::load_layout(options.layout)?;

    let mut camera: Box<dyn CameraSource> = match (options.stills, options.synthetic) {
        (Some(dir), _) => Box::new(StillFrameSource::from_dir(dir)),
        (None, true) => Box::new(SyntheticSource::new(SYNTHETIC_WIDTH, SYNTHETIC_HEIGHT)),
        (None, false) => {
            return Err(anyhow::anyhow!(
                "No camera source. Use --stills <DIR> or --synthetic"
            ));
        }
    };

    // Overlay decoding overlaps with the shots.
    let mut assets = AssetLoader::new(&config.frames_dir);
    let overlay = match &options.overlay {
        Some(name) => {
            println!("Overlay: {name} (from {})", assets.frames_dir().display());
            Some(assets.request(name)?)
        }
        None => None,
    };

    let mut session = Session::new(SessionConfig::for_layout(&layout, &config.capture))?;
    session.start(camera.as_mut())?;

    println!(
        "Photobooth session: {} shots, {}s countdown, camera {}",
        layout.shot_count(),
        config.capture.countdown_secs,
        camera.name()
    );

    loop {
        println!("\nShot {}/{}", session.index() + 1, layout.shot_count());
        if let Some(secs) = session.countdown_remaining() {
            println!("  {secs}...");
        }

        let index = loop {
            if options.wait {
                tokio::time::sleep(Countdown::TICK).await;
            }
            match session.tick(camera.as_mut())? {
                TickOutcome::Counting(secs) => println!("  {secs}..."),
                TickOutcome::Captured { index } => break index,
            }
        };

        if let Some(&(dx, dy)) = options.pans.get(index) {
            session.handle_pointer(PointerEvent::Down(Point::new(0.0, 0.0)))?;
            session.handle_pointer(PointerEvent::Move(Point::new(dx, dy)))?;
            session.handle_pointer(PointerEvent::Up)?;
        }
        if let Some(&zoom) = options.zooms.get(index) {
            session.handle_pointer(PointerEvent::PinchStart(PINCH_BASE))?;
            session.handle_pointer(PointerEvent::PinchMove(PINCH_BASE * zoom))?;
            session.handle_pointer(PointerEvent::PinchEnd)?;
        }

        if let Some(t) = session.current_transform() {
            println!(
                "  Captured. Offset ({:.1}, {:.1}), scale {:.2}",
                t.offset.x, t.offset.y, t.scale
            );
        }

        if session.confirm()? == ConfirmOutcome::ReadyToComposite {
            break;
        }
    }

    let now = chrono::Local::now();
    let session_dir = options.output.unwrap_or_else(|| {
        config
            .output_dir
            .join(format!("session-{}", now.format("%Y%m%d-%H%M%S")))
    });

    println!("\nCompositing...");
    match overlay {
        Some(handle) => {
            if !assets.is_ready(handle) {
                println!("  Waiting for overlay to decode");
                assets.wait(handle).await?;
            }
            session.composite_with_asset(&layout, &mut assets, handle, config.overlay_policy)?;
        }
        None => {
            session.composite(&layout, None, config.overlay_policy)?;
        }
    }

    let manifest = session.write_manifest(&session_dir, &layout, options.overlay.clone())?;
    println!("  Manifest: {}", manifest.display());

    let png = session
        .output()
        .ok_or_else(|| anyhow::anyhow!("Session finished without a strip"))?;
    let target = OutputTarget::File(session_dir.join(default_output_name(now)));
    if let Delivery::Saved(path) = deliver(png, &target, &config.qr)? {
        println!("  Strip: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pan() {
        assert_eq!(parse_pan("50,-20").unwrap(), (50.0, -20.0));
        assert_eq!(parse_pan(" -1.5 , 2 ").unwrap(), (-1.5, 2.0));
    }

    #[test]
    fn test_parse_pan_rejects_garbage() {
        assert!(parse_pan("50").is_err());
        assert!(parse_pan("a,b").is_err());
    }
}
