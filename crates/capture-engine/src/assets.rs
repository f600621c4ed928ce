//! Overlay frame assets.
//!
//! Loading is two-phase: `request` starts decoding `frames/<name>` on a
//! blocking worker and returns a handle right away; `is_ready` polls it;
//! `get` hands out the decoded image once it exists and refuses before.
//! `wait` is the async alternative to polling.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use tokio::sync::oneshot;

use stripbooth_common::error::{StripboothError, StripboothResult};
use stripbooth_render::export::load_rgba;

/// Opaque reference to a requested asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetHandle(u64);

type DecodeResult = StripboothResult<RgbaImage>;

enum AssetSlot {
    Pending(oneshot::Receiver<DecodeResult>),
    Ready(RgbaImage),
    Failed(String),
}

impl AssetSlot {
    fn resolve(outcome: Result<DecodeResult, oneshot::error::RecvError>) -> Self {
        match outcome {
            Ok(Ok(image)) => AssetSlot::Ready(image),
            Ok(Err(e)) => AssetSlot::Failed(e.to_string()),
            Err(_) => AssetSlot::Failed("decoder task ended without a result".to_string()),
        }
    }
}

/// Loads overlay frames from a frames directory.
pub struct AssetLoader {
    frames_dir: PathBuf,
    next_id: u64,
    slots: HashMap<AssetHandle, AssetSlot>,
    by_name: HashMap<String, AssetHandle>,
}

impl AssetLoader {
    pub fn new(frames_dir: impl Into<PathBuf>) -> Self {
        Self {
            frames_dir: frames_dir.into(),
            next_id: 0,
            slots: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Directory assets are resolved against.
    pub fn frames_dir(&self) -> &Path {
        &self.frames_dir
    }

    /// Start loading `frames/<name>`.
    ///
    /// `name` must be a plain file name. Requesting a name that is loaded
    /// or still loading returns the existing handle; a failed load is
    /// retried. Must be called from within a tokio runtime.
    pub fn request(&mut self, name: &str) -> StripboothResult<AssetHandle> {
        if name.is_empty() || Path::new(name).file_name() != Some(OsStr::new(name)) {
            return Err(StripboothError::asset(format!(
                "asset name {name:?} must be a plain file name"
            )));
        }

        if let Some(&handle) = self.by_name.get(name) {
            if !matches!(self.slots.get(&handle), Some(AssetSlot::Failed(_))) {
                return Ok(handle);
            }
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| StripboothError::asset("asset loading requires a tokio runtime"))?;

        let handle = AssetHandle(self.next_id);
        self.next_id += 1;

        let path = self.frames_dir.join(name);
        let (tx, rx) = oneshot::channel();
        tracing::debug!(asset = name, path = %path.display(), "Requesting asset");
        runtime.spawn_blocking(move || {
            // The receiver may have been dropped with the loader.
            let _ = tx.send(load_rgba(&path));
        });

        self.slots.insert(handle, AssetSlot::Pending(rx));
        self.by_name.insert(name.to_string(), handle);
        Ok(handle)
    }

    /// Whether the asset has finished decoding successfully.
    pub fn is_ready(&mut self, handle: AssetHandle) -> bool {
        self.poll(handle);
        matches!(self.slots.get(&handle), Some(AssetSlot::Ready(_)))
    }

    /// The decoded asset. Fails with `NotReady` while decoding is still
    /// running, and with an asset error if decoding failed.
    pub fn get(&mut self, handle: AssetHandle) -> StripboothResult<&RgbaImage> {
        self.poll(handle);
        match self.slots.get(&handle) {
            Some(AssetSlot::Ready(image)) => Ok(image),
            Some(AssetSlot::Pending(_)) => Err(StripboothError::not_ready(format!(
                "asset {} is still decoding",
                handle.0
            ))),
            Some(AssetSlot::Failed(message)) => Err(StripboothError::asset(message.clone())),
            None => Err(StripboothError::asset(format!(
                "unknown asset handle {}",
                handle.0
            ))),
        }
    }

    /// Await decoding, then return the asset as `get` would.
    pub async fn wait(&mut self, handle: AssetHandle) -> StripboothResult<&RgbaImage> {
        if let Some(slot) = self.slots.remove(&handle) {
            let slot = match slot {
                AssetSlot::Pending(rx) => log_settled(handle, AssetSlot::resolve(rx.await)),
                other => other,
            };
            self.slots.insert(handle, slot);
        }
        self.get(handle)
    }

    fn poll(&mut self, handle: AssetHandle) {
        let Some(slot) = self.slots.get_mut(&handle) else {
            return;
        };
        let outcome = match &mut *slot {
            AssetSlot::Pending(rx) => rx.try_recv(),
            _ => return,
        };
        let settled = match outcome {
            Ok(result) => AssetSlot::resolve(Ok(result)),
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => {
                AssetSlot::Failed("decoder task ended without a result".to_string())
            }
        };
        *slot = log_settled(handle, settled);
    }
}

fn log_settled(handle: AssetHandle, slot: AssetSlot) -> AssetSlot {
    match &slot {
        AssetSlot::Ready(image) => tracing::debug!(
            handle = handle.0,
            width = image.width(),
            height = image.height(),
            "Asset decoded"
        ),
        AssetSlot::Failed(message) => {
            tracing::warn!(handle = handle.0, error = %message, "Asset failed to load")
        }
        AssetSlot::Pending(_) => {}
    }
    slot
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn frames_dir_with(name: &str, width: u32, height: u32) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
            .save(dir.path().join(name))
            .unwrap();
        dir
    }

    #[tokio::test]
    async fn test_request_then_wait() {
        let dir = frames_dir_with("classic.png", 12, 34);
        let mut loader = AssetLoader::new(dir.path());
        assert_eq!(loader.frames_dir(), dir.path());

        let handle = loader.request("classic.png").unwrap();
        let image = loader.wait(handle).await.unwrap();
        assert_eq!(image.dimensions(), (12, 34));
        assert!(loader.is_ready(handle));
        assert_eq!(loader.get(handle).unwrap().dimensions(), (12, 34));
    }

    #[tokio::test]
    async fn test_same_name_reuses_handle() {
        let dir = frames_dir_with("classic.png", 4, 4);
        let mut loader = AssetLoader::new(dir.path());
        let a = loader.request("classic.png").unwrap();
        let b = loader.request("classic.png").unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_get_before_ready_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = AssetLoader::new(dir.path());
        let (_tx, rx) = oneshot::channel();
        let handle = AssetHandle(99);
        loader.slots.insert(handle, AssetSlot::Pending(rx));

        assert!(!loader.is_ready(handle));
        assert!(matches!(
            loader.get(handle),
            Err(StripboothError::NotReady { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_file_fails_after_wait() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = AssetLoader::new(dir.path());
        let handle = loader.request("missing.png").unwrap();

        assert!(matches!(
            loader.wait(handle).await,
            Err(StripboothError::Asset { .. })
        ));
        assert!(!loader.is_ready(handle));
    }

    #[tokio::test]
    async fn test_path_like_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = AssetLoader::new(dir.path());
        for name in ["", "../secret.png", "nested/frame.png", ".."] {
            assert!(
                matches!(loader.request(name), Err(StripboothError::Asset { .. })),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_request_outside_runtime_fails() {
        let mut loader = AssetLoader::new("frames");
        assert!(loader.request("classic.png").is_err());
    }
}
