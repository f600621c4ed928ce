//! Recompose a strip from a saved session directory.

use std::path::PathBuf;

use stripbooth_capture::{load_manifest_shots, AssetLoader};
use stripbooth_common::config::AppConfig;
use stripbooth_render::compositor::composite_session;
use stripbooth_render::export::{default_output_name, deliver, Delivery, OutputTarget};
use stripbooth_strip_model::manifest::ShotManifest;

pub async fn run(
    config: &AppConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    data_url: bool,
) -> anyhow::Result<()> {
    let manifest =
        ShotManifest::load(&path).map_err(|e| anyhow::anyhow!("Failed to load session: {e}"))?;
    let root = if path.is_dir() {
        path.clone()
    } else {
        path.parent().map(PathBuf::from).unwrap_or_default()
    };

    let missing = manifest.missing_images(&root);
    if !missing.is_empty() {
        for name in &missing {
            eprintln!("  {name}");
        }
        return Err(anyhow::anyhow!("{} shot image(s) missing", missing.len()));
    }

    let shots = load_manifest_shots(&manifest, &root)?;
    tracing::info!(
        shots = shots.len(),
        created_at = %manifest.created_at,
        overlay = ?manifest.overlay,
        "Recomposing session"
    );
    let layout = &manifest.layout;

    let mut assets = AssetLoader::new(&config.frames_dir);
    let overlay = match &manifest.overlay {
        Some(name) => {
            let handle = assets.request(name)?;
            Some(assets.wait(handle).await?)
        }
        None => None,
    };

    let png = composite_session(
        &shots,
        &layout.cells,
        layout.output,
        layout.preview,
        overlay,
        config.overlay_policy,
    )?;

    let target = if data_url {
        OutputTarget::DataUrl
    } else {
        OutputTarget::File(
            output.unwrap_or_else(|| root.join(default_output_name(chrono::Local::now()))),
        )
    };

    match deliver(&png, &target, &config.qr)? {
        Delivery::Saved(path) => println!("Strip written to: {}", path.display()),
        Delivery::DataUrl(url) => println!("{url}"),
        Delivery::QrRequest(url) => println!("{url}"),
    }

    Ok(())
}
