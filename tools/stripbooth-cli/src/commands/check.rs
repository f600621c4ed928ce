//! Check configuration, frames directory, and layout.

use std::path::PathBuf;

use stripbooth_capture::FRAME_EXTENSIONS;
use stripbooth_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, layout: Option<PathBuf>) -> anyhow::Result<()> {
    println!("Stripbooth Check");
    println!("{}", "=".repeat(50));

    let config_path = config_file_path();
    if config_path.exists() {
        match AppConfig::load_from(&config_path) {
            Ok(_) => println!("[OK] Config: {}", config_path.display()),
            Err(e) => println!("[WARN] Config {}: {e} (using defaults)", config_path.display()),
        }
    } else {
        println!("[OK] Config: defaults ({} not found)", config_path.display());
    }
    println!(
        "     {} shots, {}s countdown, overlay policy {:?}",
        config.capture.shot_count, config.capture.countdown_secs, config.overlay_policy
    );

    let layout_ok = match super::load_layout(layout) {
        Ok(layout) => {
            println!(
                "[OK] Layout: {} cells on {}x{}",
                layout.shot_count(),
                layout.output.width,
                layout.output.height
            );
            if layout.shot_count() != config.capture.shot_count {
                println!(
                    "[WARN] Config asks for {} shots; the layout decides ({}).",
                    config.capture.shot_count,
                    layout.shot_count()
                );
            }
            true
        }
        Err(e) => {
            println!("[FAIL] Layout: {e}");
            false
        }
    };

    match std::fs::read_dir(&config.frames_dir) {
        Ok(entries) => {
            let mut frames: Vec<String> = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| {
                    path.extension()
                        .and_then(|ext| ext.to_str())
                        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                        .unwrap_or(false)
                })
                .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect();
            frames.sort();
            println!(
                "[OK] Frames directory: {} ({} overlays)",
                config.frames_dir.display(),
                frames.len()
            );
            for name in &frames {
                println!("     {name}");
            }
        }
        Err(e) => println!(
            "[WARN] Frames directory {}: {e}",
            config.frames_dir.display()
        ),
    }

    println!("[OK] Output directory: {}", config.output_dir.display());
    println!("[OK] QR endpoint: {} (max {} bytes)", config.qr.endpoint, config.qr.max_payload_bytes);

    println!();
    if layout_ok {
        println!("Stripbooth is ready.");
        Ok(())
    } else {
        Err(anyhow::anyhow!("Layout is invalid"))
    }
}
