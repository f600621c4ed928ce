//! Build a QR encoder request URL.

use stripbooth_common::config::AppConfig;
use stripbooth_render::export::qr_request_url;

pub fn run(config: &AppConfig, payload: String) -> anyhow::Result<()> {
    let url = qr_request_url(&config.qr, &payload)?;
    println!("{url}");
    Ok(())
}
