//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StripboothError, StripboothResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding overlay frame assets (`frames/<name>`).
    pub frames_dir: PathBuf,

    /// Directory where finished strips and shot manifests are written.
    pub output_dir: PathBuf,

    /// Default capture settings.
    pub capture: CaptureDefaults,

    /// What to do when the overlay does not match the output canvas.
    #[serde(default)]
    pub overlay_policy: OverlayPolicy,

    /// QR request settings.
    #[serde(default)]
    pub qr: QrConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default capture parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureDefaults {
    /// Number of shots per strip.
    pub shot_count: usize,

    /// Countdown length before each shot, in seconds.
    pub countdown_secs: u32,

    /// Start each preview with the cover-fit frame centered instead of
    /// anchored at the top-left corner.
    #[serde(default)]
    pub center_initial_offset: bool,
}

/// Handling of an overlay whose pixel size differs from the output canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverlayPolicy {
    /// Abort compositing with `AssetDimensionMismatch`.
    #[default]
    Strict,
    /// Warn and stretch the overlay over the full canvas.
    Stretch,
}

/// Third-party QR encoding endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrConfig {
    /// Base URL of the encoding endpoint.
    pub endpoint: String,

    /// Requested QR image side in pixels.
    pub size_px: u32,

    /// Largest payload the endpoint accepts, in bytes.
    pub max_payload_bytes: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "stripbooth=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frames_dir: PathBuf::from("frames"),
            output_dir: dirs_default_output(),
            capture: CaptureDefaults::default(),
            overlay_policy: OverlayPolicy::default(),
            qr: QrConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            shot_count: 3,
            countdown_secs: 3,
            center_initial_offset: false,
        }
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.qrserver.com/v1/create-qr-code/".to_string(),
            size_px: 300,
            // Binary capacity of a version 40 QR code at low error correction.
            max_payload_bytes: 2953,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> StripboothResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Reject settings no session could run with.
    pub fn validate(&self) -> StripboothResult<()> {
        if self.capture.shot_count == 0 {
            return Err(StripboothError::config("capture.shot_count must be at least 1"));
        }
        if self.qr.max_payload_bytes == 0 {
            return Err(StripboothError::config("qr.max_payload_bytes must be positive"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("stripbooth").join("config.json")
}

/// Default output directory.
fn dirs_default_output() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("stripbooth").join("strips")
}
