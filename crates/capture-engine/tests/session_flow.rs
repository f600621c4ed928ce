//! End-to-end session tests: still frames in, overlaid strip out.

use image::{Rgba, RgbaImage};

use stripbooth_capture::{
    AssetLoader, ConfirmOutcome, Session, SessionConfig, SessionState, StillFrameSource,
    TickOutcome,
};
use stripbooth_common::config::{CaptureDefaults, OverlayPolicy};
use stripbooth_common::error::StripboothError;
use stripbooth_strip_model::geometry::{Dimensions, Point};
use stripbooth_strip_model::layout::StripLayout;
use stripbooth_strip_model::manifest::ShotManifest;
use stripbooth_transform::PointerEvent;

const RED: Rgba<u8> = Rgba([220, 20, 20, 255]);
const FRAME: Rgba<u8> = Rgba([255, 255, 255, 255]);

fn layout() -> StripLayout {
    StripLayout::stacked(
        Dimensions::new(124.0, 350.0),
        Dimensions::new(32.0, 50.0),
        Dimensions::new(109.0, 76.0),
        &[20.0, 137.0, 254.0],
    )
}

/// Overlay that is opaque everywhere except the cell windows.
fn overlay_for(layout: &StripLayout) -> RgbaImage {
    let size = layout.output.to_pixels();
    RgbaImage::from_fn(size.0, size.1, |x, y| {
        let (x, y) = (x as f64, y as f64);
        let in_cell = layout
            .cells
            .iter()
            .any(|c| x >= c.x && x < c.x + c.width && y >= c.y && y < c.y + c.height);
        if in_cell {
            Rgba([0, 0, 0, 0])
        } else {
            FRAME
        }
    })
}

fn fixture(layout: &StripLayout) -> (tempfile::TempDir, tempfile::TempDir) {
    let stills = tempfile::tempdir().unwrap();
    RgbaImage::from_pixel(160, 90, RED)
        .save(stills.path().join("still.png"))
        .unwrap();

    let frames = tempfile::tempdir().unwrap();
    overlay_for(layout)
        .save(frames.path().join("classic.png"))
        .unwrap();
    RgbaImage::new(40, 40)
        .save(frames.path().join("tiny.png"))
        .unwrap();

    (stills, frames)
}

fn take_all_shots(session: &mut Session, camera: &mut StillFrameSource) {
    session.start(camera).unwrap();
    loop {
        while let TickOutcome::Counting(_) = session.tick(camera).unwrap() {}

        session
            .handle_pointer(PointerEvent::Down(Point::new(0.0, 0.0)))
            .unwrap();
        session
            .handle_pointer(PointerEvent::Move(Point::new(-4.0, 0.0)))
            .unwrap();
        session.handle_pointer(PointerEvent::Up).unwrap();

        if session.confirm().unwrap() == ConfirmOutcome::ReadyToComposite {
            break;
        }
    }
}

#[tokio::test]
async fn test_session_with_overlay_asset() {
    let layout = layout();
    let (stills, frames) = fixture(&layout);

    let mut camera = StillFrameSource::from_dir(stills.path());
    let mut assets = AssetLoader::new(frames.path());
    let overlay = assets.request("classic.png").unwrap();

    let capture = CaptureDefaults {
        countdown_secs: 2,
        ..CaptureDefaults::default()
    };
    let mut session = Session::new(SessionConfig::for_layout(&layout, &capture)).unwrap();
    take_all_shots(&mut session, &mut camera);
    assert_eq!(session.state(), SessionState::Compositing);

    assets.wait(overlay).await.unwrap();
    let png = session
        .composite_with_asset(&layout, &mut assets, overlay, OverlayPolicy::Strict)
        .unwrap()
        .to_vec();
    assert_eq!(session.state(), SessionState::Done);

    let strip = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(strip.dimensions(), (124, 350));
    // Overlay border on top, photo inside each cell.
    assert_eq!(*strip.get_pixel(2, 2), FRAME);
    for cell in &layout.cells {
        let (cx, cy) = ((cell.x + cell.width / 2.0) as u32, (cell.y + cell.height / 2.0) as u32);
        assert_eq!(*strip.get_pixel(cx, cy), RED);
    }
}

#[tokio::test]
async fn test_mismatched_overlay_keeps_session_compositing() {
    let layout = layout();
    let (stills, frames) = fixture(&layout);

    let mut camera = StillFrameSource::from_dir(stills.path());
    let mut assets = AssetLoader::new(frames.path());
    let tiny = assets.request("tiny.png").unwrap();
    assets.wait(tiny).await.unwrap();

    let capture = CaptureDefaults {
        countdown_secs: 0,
        ..CaptureDefaults::default()
    };
    let mut session = Session::new(SessionConfig::for_layout(&layout, &capture)).unwrap();
    take_all_shots(&mut session, &mut camera);

    let err = session
        .composite_with_asset(&layout, &mut assets, tiny, OverlayPolicy::Strict)
        .unwrap_err();
    assert!(matches!(err, StripboothError::AssetDimensionMismatch { .. }));
    assert_eq!(session.state(), SessionState::Compositing);

    session
        .composite_with_asset(&layout, &mut assets, tiny, OverlayPolicy::Stretch)
        .unwrap();
    assert_eq!(session.state(), SessionState::Done);
}

#[tokio::test]
async fn test_missing_overlay_is_an_asset_error() {
    let layout = layout();
    let (stills, frames) = fixture(&layout);

    let mut camera = StillFrameSource::from_dir(stills.path());
    let mut assets = AssetLoader::new(frames.path());
    let missing = assets.request("nope.png").unwrap();
    assert!(assets.wait(missing).await.is_err());

    let mut session = Session::new(SessionConfig {
        countdown_secs: 0,
        ..SessionConfig::for_layout(&layout, &CaptureDefaults::default())
    })
    .unwrap();
    take_all_shots(&mut session, &mut camera);

    assert!(matches!(
        session.composite_with_asset(&layout, &mut assets, missing, OverlayPolicy::Strict),
        Err(StripboothError::Asset { .. })
    ));
    assert_eq!(session.state(), SessionState::Compositing);
}

#[test]
fn test_manifest_records_pans_in_preview_space() {
    let layout = layout();
    let (stills, _frames) = fixture(&layout);
    let out = tempfile::tempdir().unwrap();

    let mut camera = StillFrameSource::from_dir(stills.path());
    let mut session = Session::new(SessionConfig {
        countdown_secs: 1,
        ..SessionConfig::for_layout(&layout, &CaptureDefaults::default())
    })
    .unwrap();
    take_all_shots(&mut session, &mut camera);

    let path = session
        .write_manifest(out.path(), &layout, Some("classic.png".to_string()))
        .unwrap();
    let manifest = ShotManifest::load(&path).unwrap();
    assert_eq!(manifest.overlay.as_deref(), Some("classic.png"));
    assert!(manifest.missing_images(out.path()).is_empty());
    for shot in &manifest.shots {
        assert_eq!(shot.transform.offset.x, -4.0);
        assert_eq!(shot.transform.offset.y, 0.0);
    }
}
