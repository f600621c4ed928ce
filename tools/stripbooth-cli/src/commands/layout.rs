//! Print or write the strip layout.

use std::path::PathBuf;

pub fn run(layout: Option<PathBuf>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let layout = super::load_layout(layout)?;

    match output {
        Some(path) => {
            layout
                .save(&path)
                .map_err(|e| anyhow::anyhow!("Failed to write layout: {e}"))?;
            println!("Layout written to: {}", path.display());
        }
        None => {
            println!(
                "Canvas: {}x{}  Preview: {}x{}",
                layout.output.width, layout.output.height, layout.preview.width, layout.preview.height
            );
            for (i, cell) in layout.cells.iter().enumerate() {
                println!(
                    "  Cell {i}: {}x{} at ({}, {})",
                    cell.width, cell.height, cell.x, cell.y
                );
            }
            println!();
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
    }

    Ok(())
}
