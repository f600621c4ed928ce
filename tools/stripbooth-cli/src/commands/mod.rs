pub mod check;
pub mod compose;
pub mod layout;
pub mod preview;
pub mod qr;
pub mod run;

use std::path::PathBuf;

use stripbooth_strip_model::layout::StripLayout;

/// Load a layout file, or the built-in strip when none is given.
pub fn load_layout(path: Option<PathBuf>) -> anyhow::Result<StripLayout> {
    match path {
        Some(path) => StripLayout::load(&path)
            .map_err(|e| anyhow::anyhow!("Failed to load layout: {e}")),
        None => Ok(StripLayout::default()),
    }
}
