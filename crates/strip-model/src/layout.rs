//! Strip layout: output canvas, preview box, and cell placement.
//!
//! A layout is fixed for a whole session. It is stored as `layout.json`
//! so a booth can ship alternative strip designs without a rebuild.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::geometry::{Dimensions, Rect};

/// Placement of one shot inside the output canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CellLayout {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Complete geometry of a photostrip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripLayout {
    /// Output canvas size in pixels.
    pub output: Dimensions,

    /// On-screen preview box the user pans and zooms in.
    pub preview: Dimensions,

    /// One cell per shot, in shot order.
    pub cells: Vec<CellLayout>,
}

impl StripLayout {
    /// Canonical print strip width.
    pub const STRIP_WIDTH: f64 = 1240.0;
    /// Canonical print strip height.
    pub const STRIP_HEIGHT: f64 = 3508.0;
    /// Canonical cell width.
    pub const CELL_WIDTH: f64 = 1093.0;
    /// Canonical cell height.
    pub const CELL_HEIGHT: f64 = 763.0;

    /// Cells of equal size, horizontally centered, at the given tops.
    pub fn stacked(
        output: Dimensions,
        preview: Dimensions,
        cell: Dimensions,
        tops: &[f64],
    ) -> Self {
        let x = (output.width - cell.width) / 2.0;
        Self {
            output,
            preview,
            cells: tops
                .iter()
                .map(|&y| CellLayout::new(x, y, cell.width, cell.height))
                .collect(),
        }
    }

    /// Number of shots this layout holds.
    pub fn shot_count(&self) -> usize {
        self.cells.len()
    }

    /// Check sizes, bounds, and overlap.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.output.is_valid() {
            return Err(LayoutError::validation(format!(
                "output canvas {}x{} must be positive",
                self.output.width, self.output.height
            )));
        }
        if !self.preview.is_valid() {
            return Err(LayoutError::validation(format!(
                "preview box {}x{} must be positive",
                self.preview.width, self.preview.height
            )));
        }
        if self.cells.is_empty() {
            return Err(LayoutError::validation("layout has no cells"));
        }

        let canvas = Rect::from_dimensions(self.output);
        for (i, cell) in self.cells.iter().enumerate() {
            if !cell.dimensions().is_valid() {
                return Err(LayoutError::validation(format!(
                    "cell {i} has non-positive size {}x{}",
                    cell.width, cell.height
                )));
            }
            if !canvas.contains_rect(&cell.rect()) {
                return Err(LayoutError::validation(format!(
                    "cell {i} extends outside the {}x{} canvas",
                    self.output.width, self.output.height
                )));
            }
        }

        for (i, a) in self.cells.iter().enumerate() {
            for (j, b) in self.cells.iter().enumerate().skip(i + 1) {
                if a.rect().intersect(&b.rect()).is_some() {
                    return Err(LayoutError::validation(format!(
                        "cells {i} and {j} overlap"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Load and validate a layout file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref().to_path_buf();
        let json = std::fs::read_to_string(&path).map_err(|e| LayoutError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let layout: StripLayout =
            serde_json::from_str(&json).map_err(|e| LayoutError::ParseError {
                path: path.clone(),
                source: e,
            })?;
        layout.validate()?;
        Ok(layout)
    }

    /// Write the layout as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LayoutError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LayoutError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| LayoutError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        std::fs::write(&path, json).map_err(|e| LayoutError::IoError { path, source: e })
    }
}

impl Default for StripLayout {
    /// Three 1093x763 cells on a 1240x3508 strip, previewed in a 320x500 box.
    fn default() -> Self {
        Self::stacked(
            Dimensions::new(Self::STRIP_WIDTH, Self::STRIP_HEIGHT),
            Dimensions::new(320.0, 500.0),
            Dimensions::new(Self::CELL_WIDTH, Self::CELL_HEIGHT),
            &[200.0, 1370.0, 2540.0],
        )
    }
}

/// Errors that can occur when working with layouts.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid layout: {message}")]
    ValidationError { message: String },
}

impl LayoutError {
    fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}
