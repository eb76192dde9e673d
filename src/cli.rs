// Command line interface module
// Handles argument parsing and detection of a Wayland environment

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Image shown when no path is given
pub const FALLBACK_IMAGE: &str = "filerqr.png";

/// Either of these being set means a compositor should be reachable
pub const DISPLAY_ENV_VARS: [&str; 2] = ["WAYLAND_DISPLAY", "WAYLAND_SOCKET"];

/// pixview - show an RGBA PNG in a Wayland window
#[derive(Parser, Debug)]
#[command(name = "pixview")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the PNG file
    #[arg(value_name = "IMAGE")]
    pub image_path: Option<PathBuf>,
}

/// Arguments with the image path resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub image_path: PathBuf,
    /// True when no path was given and `FALLBACK_IMAGE` is used
    pub used_fallback: bool,
}

impl From<Args> for ParsedArgs {
    fn from(args: Args) -> Self {
        match args.image_path {
            Some(image_path) => ParsedArgs {
                image_path,
                used_fallback: false,
            },
            None => ParsedArgs {
                image_path: PathBuf::from(FALLBACK_IMAGE),
                used_fallback: true,
            },
        }
    }
}

/// Parse the process arguments
pub fn parse_args() -> ParsedArgs {
    Args::parse().into()
}

/// Whether the environment advertises a Wayland display
pub fn display_available() -> bool {
    display_available_with(|name| std::env::var_os(name))
}

fn display_available_with<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<OsString>,
{
    DISPLAY_ENV_VARS
        .iter()
        .any(|name| lookup(name).is_some_and(|value| !value.is_empty()))
}
