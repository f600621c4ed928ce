//! Stripbooth CLI: photobooth sessions, framing previews, and strip output.
//!
//! Usage:
//!   stripbooth layout [OPTIONS]      Print or write the strip layout
//!   stripbooth preview <IMAGE>       Render one shot's preview box
//!   stripbooth run [OPTIONS]         Run a full photobooth session
//!   stripbooth compose <DIR>         Recompose a strip from a saved session
//!   stripbooth qr <PAYLOAD>          Build a QR encoder request URL
//!   stripbooth check                 Check configuration and assets

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use stripbooth_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "stripbooth",
    about = "Photobooth strips: timed shots, pan and zoom framing, overlay compositing",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the strip layout, or write it to a file
    Layout {
        /// Layout file to describe instead of the built-in one
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Write the layout JSON here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render one shot as it appears in the preview box
    Preview {
        /// Still frame to preview
        image: PathBuf,

        /// Horizontal pan in preview pixels
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        offset_x: f64,

        /// Vertical pan in preview pixels
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        offset_y: f64,

        /// Zoom factor on top of the cover fit
        #[arg(long, default_value = "1.0")]
        scale: f64,

        /// Overlay frame name under the frames directory
        #[arg(long)]
        overlay: Option<String>,

        /// Cell whose overlay slice is drawn over the preview
        #[arg(long, default_value = "0")]
        cell: usize,

        /// Layout file (defaults to the built-in strip)
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Output PNG path
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,
    },

    /// Run a full photobooth session
    Run {
        /// Directory of still frames standing in for the camera
        #[arg(long, conflicts_with = "synthetic")]
        stills: Option<PathBuf>,

        /// Use a generated test pattern as the camera
        #[arg(long)]
        synthetic: bool,

        /// Overlay frame name under the frames directory
        #[arg(long)]
        overlay: Option<String>,

        /// Per-shot pan as DX,DY in preview pixels (repeat for each shot)
        #[arg(long = "pan", value_parser = commands::run::parse_pan, allow_hyphen_values = true)]
        pans: Vec<(f64, f64)>,

        /// Per-shot zoom factor (repeat for each shot)
        #[arg(long = "zoom")]
        zooms: Vec<f64>,

        /// Skip the real-time countdown delay
        #[arg(long)]
        no_wait: bool,

        /// Layout file (defaults to the built-in strip)
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Session directory (defaults to a timestamped folder in the output dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Recompose a strip from a saved session directory
    Compose {
        /// Session directory containing manifest.json
        path: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a data URL instead of writing a file
        #[arg(long)]
        data_url: bool,
    },

    /// Build a QR encoder request URL for a payload
    Qr {
        /// Text or link to encode
        payload: String,
    },

    /// Check configuration, frames directory, and layout
    Check {
        /// Layout file to validate (defaults to the built-in strip)
        #[arg(long)]
        layout: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    stripbooth_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Layout { layout, output } => commands::layout::run(layout, output),
        Commands::Preview {
            image,
            offset_x,
            offset_y,
            scale,
            overlay,
            cell,
            layout,
            output,
        } => commands::preview::run(
            &config, image, offset_x, offset_y, scale, overlay, cell, layout, output,
        )
        .await,
        Commands::Run {
            stills,
            synthetic,
            overlay,
            pans,
            zooms,
            no_wait,
            layout,
            output,
        } => {
            let options = commands::run::RunOptions {
                stills,
                synthetic,
                overlay,
                pans,
                zooms,
                wait: !no_wait,
                layout,
                output,
            };
            commands::run::run(&config, options).await
        }
        Commands::Compose {
            path,
            output,
            data_url,
        } => commands::compose::run(&config, path, output, data_url).await,
        Commands::Qr { payload } => commands::qr::run(&config, payload),
        Commands::Check { layout } => commands::check::run(&config, layout),
    }
}
