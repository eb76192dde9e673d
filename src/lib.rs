// pixview - A minimal PNG viewer for Wayland
// Decodes an RGBA PNG and blits it into a window until the window is closed

pub mod app;
pub mod cli;
pub mod error;
pub mod image_loader;
pub mod rasterizer;
pub mod surface;
pub mod wayland;

pub use error::ViewerError;
