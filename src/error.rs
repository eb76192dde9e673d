// Error types
// Failures the decoder, surface and session can report

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// The image file could not be opened or read
    #[error("cannot open image file {}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Not a PNG, a malformed or truncated PNG, or decoder allocation failure
    #[error("failed to decode PNG: {0}")]
    Decode(String),

    /// A valid PNG that is not 8-bit RGBA
    #[error("only 8-bit RGBA PNGs are supported (got {color_type:?} at {bit_depth:?})")]
    UnsupportedFormat {
        color_type: png::ColorType,
        bit_depth: png::BitDepth,
    },

    /// No connection to the Wayland compositor
    #[error("Wayland display unavailable: {0}")]
    DisplayUnavailable(String),

    /// The raster buffer for the window could not be allocated
    #[error("cannot allocate a {width}x{height} pixel surface")]
    SurfaceAllocation { width: u32, height: u32 },
}

impl From<png::DecodingError> for ViewerError {
    fn from(err: png::DecodingError) -> Self {
        ViewerError::Decode(err.to_string())
    }
}
