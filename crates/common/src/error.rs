//! Error types shared across Stripbooth crates.

use std::path::PathBuf;

/// Top-level error type for Stripbooth operations.
#[derive(Debug, thiserror::Error)]
pub enum StripboothError {
    /// A source, preview, cell, or canvas box has a non-positive side.
    #[error("Invalid dimension: {width}x{height}")]
    InvalidDimension { width: f64, height: f64 },

    /// Shot count and cell count disagree at composite time.
    #[error("Layout mismatch: {shots} shot(s) for {cells} cell(s)")]
    LayoutMismatch { shots: usize, cells: usize },

    /// The overlay frame does not match the output canvas.
    #[error(
        "Overlay is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}"
    )]
    AssetDimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Camera unavailable: {message}")]
    CameraUnavailable { message: String },

    /// A resource was read before its readiness predicate held.
    #[error("Resource not ready: {message}")]
    NotReady { message: String },

    #[error("Payload of {len} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Asset error: {message}")]
    Asset { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using StripboothError.
pub type StripboothResult<T> = Result<T, StripboothError>;

impl StripboothError {
    pub fn invalid_dimension(width: f64, height: f64) -> Self {
        Self::InvalidDimension { width, height }
    }

    pub fn camera_unavailable(msg: impl Into<String>) -> Self {
        Self::CameraUnavailable {
            message: msg.into(),
        }
    }

    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
