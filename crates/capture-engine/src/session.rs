//! Photobooth session management.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use stripbooth_common::config::{CaptureDefaults, OverlayPolicy};
use stripbooth_common::countdown::{Countdown, CountdownTick};
use stripbooth_common::error::{StripboothError, StripboothResult};
use stripbooth_render::compositor::{composite_session, Shot};
use stripbooth_render::export::load_rgba;
use stripbooth_render::preview::render_preview;
use stripbooth_strip_model::geometry::Dimensions;
use stripbooth_strip_model::layout::StripLayout;
use stripbooth_strip_model::manifest::{ShotEntry, ShotManifest};
use stripbooth_strip_model::shot::ShotTransform;
use stripbooth_transform::{centered_offset, GestureTracker, PointerEvent};

use crate::assets::{AssetHandle, AssetLoader};
use crate::source::CameraSource;

/// Configuration for a photobooth session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Shots per strip.
    pub shot_count: usize,

    /// Countdown before each shot, in seconds.
    pub countdown_secs: u32,

    /// Preview box the user frames each shot in.
    pub preview: Dimensions,

    /// Start each preview centered instead of top-left anchored.
    pub center_initial_offset: bool,
}

impl SessionConfig {
    /// Session matching a strip layout: one shot per cell.
    pub fn for_layout(layout: &StripLayout, capture: &CaptureDefaults) -> Self {
        Self {
            shot_count: layout.shot_count(),
            countdown_secs: capture.countdown_secs,
            preview: layout.preview,
            center_initial_offset: capture.center_initial_offset,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::for_layout(&StripLayout::default(), &CaptureDefaults::default())
    }
}

/// State of a photobooth session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not started, or aborted.
    Idle,
    /// Counting down to the next shot.
    Countdown,
    /// A frame was captured and is being framed by the user.
    Preview,
    /// All shots confirmed; waiting for the composite.
    Compositing,
    /// Strip produced.
    Done,
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Seconds still to go.
    Counting(u32),
    /// The countdown elapsed and shot `index` is now in preview.
    Captured { index: usize },
}

/// Result of confirming a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// More shots to take; the countdown for `index` has started.
    NextShot { index: usize },
    /// Every shot is confirmed.
    ReadyToComposite,
}

#[derive(Debug, Clone)]
struct PendingShot {
    frame: RgbaImage,
    transform: ShotTransform,
}

/// A photobooth session: countdown, preview, confirm/retake, composite.
///
/// Every operation checks the current state first; an invalid transition
/// returns a session error and leaves the session unchanged.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    index: usize,
    shots: Vec<Shot>,
    countdown: Countdown,
    pending: Option<PendingShot>,
    gestures: GestureTracker,
    output: Option<Vec<u8>>,
}

impl Session {
    /// Create an idle session.
    pub fn new(config: SessionConfig) -> StripboothResult<Self> {
        if config.shot_count == 0 {
            return Err(StripboothError::session("shot count must be at least 1"));
        }
        if !config.preview.is_valid() {
            return Err(StripboothError::invalid_dimension(
                config.preview.width,
                config.preview.height,
            ));
        }
        Ok(Self {
            countdown: Countdown::new(config.countdown_secs),
            shots: Vec::with_capacity(config.shot_count),
            config,
            state: SessionState::Idle,
            index: 0,
            pending: None,
            gestures: GestureTracker::new(),
            output: None,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Index of the shot being taken (equals the shot count once all are
    /// confirmed).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Confirmed shots so far.
    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    /// Seconds left on the running countdown.
    pub fn countdown_remaining(&self) -> Option<u32> {
        (self.state == SessionState::Countdown).then(|| self.countdown.remaining_secs())
    }

    /// Transform of the shot in preview.
    pub fn current_transform(&self) -> Option<ShotTransform> {
        self.pending.as_ref().map(|p| p.transform)
    }

    /// Still frame of the shot in preview.
    pub fn pending_frame(&self) -> Option<&RgbaImage> {
        self.pending.as_ref().map(|p| &p.frame)
    }

    /// Encoded strip, once done.
    pub fn output(&self) -> Option<&[u8]> {
        self.output.as_deref()
    }

    /// Begin a new strip.
    ///
    /// Allowed from `Idle` or `Done`. Clears previous shots. If the camera
    /// is not ready, exactly one acquisition attempt is made; on failure
    /// the session stays `Idle`.
    pub fn start(&mut self, camera: &mut dyn CameraSource) -> StripboothResult<()> {
        if !matches!(self.state, SessionState::Idle | SessionState::Done) {
            return Err(self.invalid("start"));
        }

        self.reset();

        if !camera.is_ready() {
            if let Err(e) = camera.acquire() {
                tracing::warn!(source = camera.name(), error = %e, "Camera unavailable");
                return Err(match e {
                    StripboothError::CameraUnavailable { .. } => e,
                    other => StripboothError::camera_unavailable(other.to_string()),
                });
            }
        }
        if !camera.is_ready() {
            tracing::warn!(source = camera.name(), "Camera did not become ready");
            return Err(StripboothError::camera_unavailable(format!(
                "{} is not ready",
                camera.name()
            )));
        }

        self.state = SessionState::Countdown;
        let frame_size = camera.dimensions().map(|d| d.to_pixels());
        tracing::info!(
            shots = self.config.shot_count,
            countdown_secs = self.config.countdown_secs,
            source = camera.name(),
            ?frame_size,
            "Session started"
        );
        Ok(())
    }

    /// Advance the countdown by one second; at zero, grab a still frame
    /// and enter preview.
    pub fn tick(&mut self, camera: &mut dyn CameraSource) -> StripboothResult<TickOutcome> {
        if self.state != SessionState::Countdown {
            return Err(self.invalid("tick"));
        }

        match self.countdown.tick() {
            CountdownTick::Remaining(secs) => Ok(TickOutcome::Counting(secs)),
            CountdownTick::Elapsed => self.capture(camera),
        }
    }

    fn capture(&mut self, camera: &mut dyn CameraSource) -> StripboothResult<TickOutcome> {
        if !camera.is_ready() {
            return Err(StripboothError::camera_unavailable(format!(
                "{} stopped delivering frames",
                camera.name()
            )));
        }
        if let Some(reported) = camera.dimensions() {
            if !reported.is_valid() {
                return Err(StripboothError::invalid_dimension(
                    reported.width,
                    reported.height,
                ));
            }
        }

        let frame = camera.grab_frame()?;
        let source = Dimensions::from_pixels(frame.width(), frame.height());
        if !source.is_valid() {
            return Err(StripboothError::invalid_dimension(source.width, source.height));
        }

        let transform = if self.config.center_initial_offset {
            ShotTransform::IDENTITY.with_offset(centered_offset(source, self.config.preview, 1.0)?)
        } else {
            ShotTransform::IDENTITY
        };

        self.pending = Some(PendingShot { frame, transform });
        self.gestures.reset();
        self.state = SessionState::Preview;
        tracing::info!(
            index = self.index,
            width = source.width,
            height = source.height,
            "Shot captured"
        );
        Ok(TickOutcome::Captured { index: self.index })
    }

    /// Feed pointer input to the shot in preview. Returns the new
    /// transform when it changed.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
    ) -> StripboothResult<Option<ShotTransform>> {
        if self.state != SessionState::Preview {
            return Err(self.invalid("adjust"));
        }
        let pending = self
            .pending
            .as_mut()
            .ok_or_else(|| StripboothError::session("no shot in preview"))?;

        let updated = self.gestures.apply(&pending.transform, event);
        if let Some(transform) = updated {
            pending.transform = transform;
        }
        Ok(updated)
    }

    /// Draw the shot in preview, optionally under its overlay slice.
    pub fn render_preview(&self, overlay_slice: Option<&RgbaImage>) -> StripboothResult<RgbaImage> {
        match (&self.pending, self.state) {
            (Some(pending), SessionState::Preview) => render_preview(
                &pending.frame,
                self.config.preview,
                &pending.transform,
                overlay_slice,
            ),
            _ => Err(self.invalid("render a preview")),
        }
    }

    /// Keep the shot in preview with its current transform.
    pub fn confirm(&mut self) -> StripboothResult<ConfirmOutcome> {
        if self.state != SessionState::Preview {
            return Err(self.invalid("confirm"));
        }
        let pending = self
            .pending
            .take()
            .ok_or_else(|| StripboothError::session("no shot in preview"))?;

        tracing::info!(
            index = self.index,
            offset_x = pending.transform.offset.x,
            offset_y = pending.transform.offset.y,
            scale = pending.transform.scale,
            "Shot confirmed"
        );
        self.shots.push(Shot::new(pending.frame, pending.transform));
        self.index += 1;
        self.gestures.reset();

        if self.index == self.config.shot_count {
            self.state = SessionState::Compositing;
            Ok(ConfirmOutcome::ReadyToComposite)
        } else {
            self.countdown.reset();
            self.state = SessionState::Countdown;
            Ok(ConfirmOutcome::NextShot { index: self.index })
        }
    }

    /// Discard the shot in preview and count down again for the same index.
    pub fn retake(&mut self) -> StripboothResult<()> {
        if self.state != SessionState::Preview {
            return Err(self.invalid("retake"));
        }
        self.pending = None;
        self.gestures.reset();
        self.countdown.reset();
        self.state = SessionState::Countdown;
        tracing::info!(index = self.index, "Retaking shot");
        Ok(())
    }

    /// Composite all confirmed shots into `layout` with an already decoded
    /// overlay.
    ///
    /// On success the strip is kept and the session is `Done`. On failure
    /// the session stays in `Compositing` so the caller can retry or abort.
    pub fn composite(
        &mut self,
        layout: &StripLayout,
        overlay: Option<&RgbaImage>,
        policy: OverlayPolicy,
    ) -> StripboothResult<&[u8]> {
        if self.state != SessionState::Compositing {
            return Err(self.invalid("composite"));
        }
        if layout.preview != self.config.preview {
            tracing::warn!(
                layout_preview = ?layout.preview,
                session_preview = ?self.config.preview,
                "Layout preview box differs from the one shots were framed in"
            );
        }

        let png = composite_session(
            &self.shots,
            &layout.cells,
            layout.output,
            self.config.preview,
            overlay,
            policy,
        )?;

        self.state = SessionState::Done;
        tracing::info!(bytes = png.len(), "Session done");
        Ok(self.output.insert(png).as_slice())
    }

    /// Composite using an overlay from the asset loader. Refuses with
    /// `NotReady` until the overlay has decoded.
    pub fn composite_with_asset(
        &mut self,
        layout: &StripLayout,
        assets: &mut AssetLoader,
        overlay: AssetHandle,
        policy: OverlayPolicy,
    ) -> StripboothResult<&[u8]> {
        if self.state != SessionState::Compositing {
            return Err(self.invalid("composite"));
        }
        let image = assets.get(overlay)?;
        self.composite(layout, Some(image), policy)
    }

    /// Drop everything and return to `Idle`.
    pub fn abort(&mut self) {
        if self.state != SessionState::Idle {
            tracing::info!(state = ?self.state, index = self.index, "Session aborted");
        }
        self.reset();
    }

    /// Save confirmed shots as `shot-N.png` plus `manifest.json` in `dir`.
    pub fn write_manifest(
        &self,
        dir: &Path,
        layout: &StripLayout,
        overlay: Option<String>,
    ) -> StripboothResult<PathBuf> {
        if !matches!(self.state, SessionState::Compositing | SessionState::Done) {
            return Err(self.invalid("write a manifest"));
        }
        std::fs::create_dir_all(dir)?;

        let mut manifest = ShotManifest::new(layout.clone(), overlay);
        for (i, shot) in self.shots.iter().enumerate() {
            let name = format!("shot-{i}.png");
            shot.frame.save(dir.join(&name)).map_err(|e| {
                StripboothError::session(format!("Failed to save {name}: {e}"))
            })?;
            manifest.shots.push(ShotEntry {
                image: name,
                transform: shot.transform,
            });
        }

        let path = manifest
            .save(dir)
            .map_err(|e| StripboothError::session(format!("Failed to save manifest: {e}")))?;
        tracing::info!(path = %path.display(), shots = self.shots.len(), "Manifest written");
        Ok(path)
    }

    fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.index = 0;
        self.shots.clear();
        self.pending = None;
        self.output = None;
        self.gestures.reset();
        self.countdown.reset();
    }

    fn invalid(&self, action: &str) -> StripboothError {
        StripboothError::session(format!("cannot {action} while {:?}", self.state))
    }
}

/// Load the shots a manifest refers to, resolving images against `root`.
pub fn load_manifest_shots(manifest: &ShotManifest, root: &Path) -> StripboothResult<Vec<Shot>> {
    manifest
        .image_paths(root)
        .iter()
        .zip(&manifest.shots)
        .map(|(path, entry)| Ok(Shot::new(load_rgba(path)?, entry.transform)))
        .collect()
}
