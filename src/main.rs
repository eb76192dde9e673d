// pixview - A minimal PNG viewer for Wayland
// Entry point: logging, argument parsing and the display check

use anyhow::Result;
use log::{error, info, warn};
use pixview::{cli, wayland};

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args = cli::parse_args();

    if !cli::display_available() {
        warn!("Wayland is not running (WAYLAND_DISPLAY is unset), nothing to show");
        return Ok(());
    }

    if args.used_fallback {
        warn!(
            "No image path given, falling back to {}",
            args.image_path.display()
        );
    }

    info!("Starting pixview with image: {:?}", args.image_path);

    // Failures are reported but never change the exit status
    if let Err(e) = wayland::run(&args.image_path) {
        error!("{:#}", e);
    }

    Ok(())
}
