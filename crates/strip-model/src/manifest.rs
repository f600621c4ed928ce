//! Shot manifest (`manifest.json`).
//!
//! Written next to the saved snapshots of a finished session so the strip
//! can be recomposited later, for example with a different overlay.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::layout::{LayoutError, StripLayout};
use crate::shot::ShotTransform;

/// File name used for manifests inside a session directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Saved record of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotManifest {
    /// Schema version.
    pub version: String,

    /// Creation timestamp (RFC 3339).
    pub created_at: String,

    /// Overlay asset name under the frames directory, if one was used.
    #[serde(default)]
    pub overlay: Option<String>,

    /// Layout the transforms were confirmed against.
    pub layout: StripLayout,

    /// Confirmed shots in order.
    pub shots: Vec<ShotEntry>,
}

/// One saved snapshot and its confirmed transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotEntry {
    /// Image path, relative to the manifest's directory.
    pub image: String,

    pub transform: ShotTransform,
}

impl ShotManifest {
    /// Create an empty manifest stamped with the current time.
    pub fn new(layout: StripLayout, overlay: Option<String>) -> Self {
        Self {
            version: "1.0".to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            overlay,
            layout,
            shots: vec![],
        }
    }

    /// Load a manifest from a session directory or a manifest file path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = manifest_path(path.as_ref());
        let json = std::fs::read_to_string(&path).map_err(|e| LayoutError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let manifest: ShotManifest =
            serde_json::from_str(&json).map_err(|e| LayoutError::ParseError {
                path: path.clone(),
                source: e,
            })?;
        manifest.layout.validate()?;
        Ok(manifest)
    }

    /// Save into `dir/manifest.json`.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf, LayoutError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| LayoutError::IoError {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| LayoutError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        std::fs::write(&path, json).map_err(|e| LayoutError::IoError {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }

    /// Absolute image paths, resolved against `root`.
    pub fn image_paths(&self, root: impl AsRef<Path>) -> Vec<PathBuf> {
        let root = root.as_ref();
        self.shots.iter().map(|s| root.join(&s.image)).collect()
    }

    /// Report image files that do not exist under `root`.
    pub fn missing_images(&self, root: impl AsRef<Path>) -> Vec<String> {
        self.image_paths(root)
            .into_iter()
            .zip(&self.shots)
            .filter(|(path, _)| !path.exists())
            .map(|(_, shot)| format!("Shot image missing: {}", shot.image))
            .collect()
    }
}

/// Accept either a directory or a direct path to the manifest file.
fn manifest_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(MANIFEST_FILE)
    } else {
        path.to_path_buf()
    }
}
