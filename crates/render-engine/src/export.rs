//! Image encoding and output delivery.
//!
//! A finished strip leaves the engine as PNG bytes and is handed to one of
//! three sinks: a file on disk (the download), a `data:` URL, or a request
//! URL for a third-party QR encoder. QR payloads are size-bounded, and a
//! full-resolution strip never fits; that case is reported, not worked
//! around.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::Engine;
use image::{ImageFormat, RgbaImage};
use url::Url;

use stripbooth_common::config::QrConfig;
use stripbooth_common::error::{StripboothError, StripboothResult};

/// Where a finished strip goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write a PNG file.
    File(PathBuf),
    /// Produce a `data:image/png;base64,...` URL.
    DataUrl,
    /// Produce a QR encoder request URL carrying `payload`.
    Qr { payload: String },
}

/// Result of handing a strip to its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Saved(PathBuf),
    DataUrl(String),
    QrRequest(Url),
}

/// Encode an RGBA buffer as PNG.
pub fn encode_png(image: &RgbaImage) -> StripboothResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| StripboothError::render(format!("PNG encoding failed: {e}")))?;
    Ok(bytes)
}

/// Decode any supported image file into RGBA.
pub fn load_rgba(path: &Path) -> StripboothResult<RgbaImage> {
    if !path.exists() {
        return Err(StripboothError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let image = image::open(path).map_err(|e| {
        StripboothError::render(format!("Failed to decode {}: {e}", path.display()))
    })?;
    Ok(image.to_rgba8())
}

/// Write PNG bytes to `path`, creating parent directories.
pub fn save_png(png: &[u8], path: &Path) -> StripboothResult<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, png)?;
    tracing::info!(path = %path.display(), bytes = png.len(), "Saved photostrip");
    Ok(path.to_path_buf())
}

/// PNG bytes as a `data:` URL.
pub fn png_data_url(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

/// Request URL asking the QR encoder at `config.endpoint` to encode `payload`.
///
/// Fails with `PayloadTooLarge` when the payload exceeds
/// `config.max_payload_bytes`.
pub fn qr_request_url(config: &QrConfig, payload: &str) -> StripboothResult<Url> {
    if payload.len() > config.max_payload_bytes {
        return Err(StripboothError::PayloadTooLarge {
            len: payload.len(),
            max: config.max_payload_bytes,
        });
    }

    let mut url = Url::parse(&config.endpoint).map_err(|e| {
        StripboothError::config(format!("Invalid QR endpoint {:?}: {e}", config.endpoint))
    })?;
    url.query_pairs_mut()
        .append_pair("size", &format!("{0}x{0}", config.size_px))
        .append_pair("data", payload);
    Ok(url)
}

/// Timestamped file name for a finished strip.
pub fn default_output_name(at: chrono::DateTime<chrono::Local>) -> String {
    format!("photostrip-{}.png", at.format("%Y%m%d-%H%M%S"))
}

/// Hand a finished strip to `target`.
pub fn deliver(png: &[u8], target: &OutputTarget, qr: &QrConfig) -> StripboothResult<Delivery> {
    match target {
        OutputTarget::File(path) => save_png(png, path).map(Delivery::Saved),
        OutputTarget::DataUrl => Ok(Delivery::DataUrl(png_data_url(png))),
        OutputTarget::Qr { payload } => {
            let url = qr_request_url(qr, payload)?;
            tracing::info!(payload_bytes = payload.len(), "Built QR request");
            Ok(Delivery::QrRequest(url))
        }
    }
}
