//! Camera sources.
//!
//! A source is acquired once per session start and then asked for still
//! frames whenever a countdown elapses. Frames are owned snapshots, so a
//! subject that keeps moving after the shot does not change what the user
//! frames in the preview.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

use stripbooth_common::error::{StripboothError, StripboothResult};
use stripbooth_render::export::load_rgba;
use stripbooth_strip_model::geometry::Dimensions;

/// A camera-like pixel source.
pub trait CameraSource: Send {
    /// Human-readable source name for logs.
    fn name(&self) -> &str;

    /// Try to open the source. Called at most once per session start.
    fn acquire(&mut self) -> StripboothResult<()>;

    /// Whether frames can be grabbed.
    fn is_ready(&self) -> bool;

    /// Pixel size of the frames this source produces, once known.
    fn dimensions(&self) -> Option<Dimensions>;

    /// Grab one still frame.
    fn grab_frame(&mut self) -> StripboothResult<RgbaImage>;
}

/// Image file extensions read as still frames or overlay frames.
pub const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];

/// Replays still images from disk in place of a live camera.
///
/// Frames are served in file-name order and wrap around, so a directory
/// with one picture serves every shot.
#[derive(Debug)]
pub struct StillFrameSource {
    name: String,
    dir: Option<PathBuf>,
    files: Vec<PathBuf>,
    next: usize,
    dimensions: Option<Dimensions>,
    ready: bool,
}

impl StillFrameSource {
    /// Source backed by every image file in `dir`.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            name: format!("stills:{}", dir.display()),
            dir: Some(dir),
            files: vec![],
            next: 0,
            dimensions: None,
            ready: false,
        }
    }

    /// Source backed by an explicit list of files.
    pub fn from_files(files: Vec<PathBuf>) -> Self {
        Self {
            name: "stills:files".to_string(),
            dir: None,
            files,
            next: 0,
            dimensions: None,
            ready: false,
        }
    }

    fn scan(dir: &Path) -> StripboothResult<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| {
                StripboothError::camera_unavailable(format!("cannot read {}: {e}", dir.display()))
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        Ok(files)
    }
}

impl CameraSource for StillFrameSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn acquire(&mut self) -> StripboothResult<()> {
        if let Some(dir) = &self.dir {
            self.files = Self::scan(dir)?;
        }
        let first = self
            .files
            .first()
            .ok_or_else(|| StripboothError::camera_unavailable("no still frames found"))?;
        let frame = load_rgba(first)
            .map_err(|e| StripboothError::camera_unavailable(e.to_string()))?;

        self.dimensions = Some(Dimensions::from_pixels(frame.width(), frame.height()));
        self.next = 0;
        self.ready = true;
        tracing::info!(source = %self.name, frames = self.files.len(), "Still frame source ready");
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    fn grab_frame(&mut self) -> StripboothResult<RgbaImage> {
        if !self.ready || self.files.is_empty() {
            return Err(StripboothError::not_ready("still frame source not acquired"));
        }
        let path = &self.files[self.next % self.files.len()];
        let frame = load_rgba(path)?;
        self.next += 1;
        self.dimensions = Some(Dimensions::from_pixels(frame.width(), frame.height()));
        Ok(frame)
    }
}

/// Generated test pattern with a per-frame marker.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    width: u32,
    height: u32,
    available: bool,
    ready: bool,
    acquire_attempts: u32,
    frames_grabbed: u32,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            available: true,
            ready: false,
            acquire_attempts: 0,
            frames_grabbed: 0,
        }
    }

    /// A source whose acquisition always fails, like a denied camera.
    pub fn unavailable(width: u32, height: u32) -> Self {
        Self {
            available: false,
            ..Self::new(width, height)
        }
    }

    /// How many times `acquire` has been called.
    pub fn acquire_attempts(&self) -> u32 {
        self.acquire_attempts
    }

    /// How many frames have been grabbed.
    pub fn frames_grabbed(&self) -> u32 {
        self.frames_grabbed
    }

    /// Horizontal gradient over a dark background, with a bright band whose
    /// row depends on the frame number.
    fn pattern(&self, frame: u32) -> RgbaImage {
        let band = self.height.max(1) / 8;
        let band_top = (frame * band) % self.height.max(1);
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            if y >= band_top && y < band_top + band {
                Rgba([250, 250, 250, 255])
            } else {
                let r = (x * 255 / self.width.max(1)) as u8;
                let b = (y * 255 / self.height.max(1)) as u8;
                Rgba([r, 60, b, 255])
            }
        })
    }
}

impl CameraSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn acquire(&mut self) -> StripboothResult<()> {
        self.acquire_attempts += 1;
        if !self.available {
            return Err(StripboothError::camera_unavailable(
                "synthetic camera configured as unavailable",
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(StripboothError::invalid_dimension(
                self.width as f64,
                self.height as f64,
            ));
        }
        self.ready = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn dimensions(&self) -> Option<Dimensions> {
        Some(Dimensions::from_pixels(self.width, self.height))
    }

    fn grab_frame(&mut self) -> StripboothResult<RgbaImage> {
        if !self.ready {
            return Err(StripboothError::not_ready("synthetic camera not acquired"));
        }
        let frame = self.pattern(self.frames_grabbed);
        self.frames_grabbed += 1;
        Ok(frame)
    }
}
