// Pixel surface module
// The window's raster image, laid out as wl_shm Xrgb8888

use crate::error::ViewerError;

/// Bytes per pixel: blue, green, red, padding
pub const BYTES_PER_PIXEL: usize = 4;

/// An owned raster buffer the size of the window
#[derive(Debug, Clone)]
pub struct Surface {
    buffer: Vec<u8>,
    width: u32,
    height: u32,
}

impl Surface {
    /// Allocate a zeroed (black) surface
    pub fn new(width: u32, height: u32) -> Result<Self, ViewerError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or(ViewerError::SurfaceAllocation { width, height })?;

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| ViewerError::SurfaceAllocation { width, height })?;
        buffer.resize(len, 0);

        Ok(Self {
            buffer,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row length in bytes
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL)
    }

    /// Write one pixel. Coordinates outside the surface are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        let Some(offset) = self.offset(x, y) else {
            return;
        };
        self.buffer[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&[b, g, r, 0]);
    }

    /// The raw B, G, R, padding bytes of one pixel
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        let offset = self.offset(x, y)?;
        let mut px = [0; BYTES_PER_PIXEL];
        px.copy_from_slice(&self.buffer[offset..offset + BYTES_PER_PIXEL]);
        Some(px)
    }

    /// Paint every pixel one color
    pub fn fill(&mut self, r: u8, g: u8, b: u8) {
        for px in self.buffer.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&[b, g, r, 0]);
        }
    }
}
