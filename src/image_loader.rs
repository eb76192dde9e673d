// Image loading module
// Decodes an RGBA PNG into a flat list of colored points

use crate::error::ViewerError;
use image::ImageFormat;
use log::{debug, info};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// One decoded pixel: its grid position and RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColoredPoint {
    pub x: u32,
    pub y: u32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A decoded image, one point per source pixel in row-major order
#[derive(Debug, Clone)]
pub struct DecodedImage {
    points: Vec<ColoredPoint>,
    width: u32,
    height: u32,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of points; always `width * height`
    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[ColoredPoint] {
        &self.points
    }

    /// Look up the point at a source coordinate
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<&ColoredPoint> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.points.get(index)
    }
}

/// Read a PNG file from disk and decode it
pub fn decode(path: &Path) -> Result<DecodedImage, ViewerError> {
    let data = fs::read(path).map_err(|source| ViewerError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", data.len(), path.display());

    let image = decode_bytes(&data)?;
    info!(
        "Decoded {}: {}x{} ({} points)",
        path.display(),
        image.width,
        image.height,
        image.count()
    );
    Ok(image)
}

/// Decode an in-memory PNG. Only 8-bit RGBA is accepted.
pub fn decode_bytes(data: &[u8]) -> Result<DecodedImage, ViewerError> {
    let format = image::guess_format(data)
        .map_err(|e| ViewerError::Decode(format!("unrecognised image data: {}", e)))?;
    if format != ImageFormat::Png {
        return Err(ViewerError::Decode(format!(
            "not a PNG (detected {:?})",
            format
        )));
    }

    // Identity transformations keep the file's own color type visible,
    // otherwise palette and low-depth images would be expanded to RGBA.
    let mut decoder = png::Decoder::new(Cursor::new(data));
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;

    let info = reader.info();
    let (width, height) = (info.width, info.height);
    let (color_type, bit_depth) = (info.color_type, info.bit_depth);
    debug!(
        "PNG header: {}x{}, {:?}, {:?}",
        width, height, color_type, bit_depth
    );

    if color_type != png::ColorType::Rgba || bit_depth != png::BitDepth::Eight {
        return Err(ViewerError::UnsupportedFormat {
            color_type,
            bit_depth,
        });
    }

    let mut frame = try_alloc_zeroed(reader.output_buffer_size())?;
    let output = reader.next_frame(&mut frame)?;
    let line_size = output.line_size;

    let total = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| ViewerError::Decode(format!("{}x{} is too large", width, height)))?;
    let mut points = Vec::new();
    points
        .try_reserve_exact(total)
        .map_err(|e| ViewerError::Decode(format!("cannot allocate {} points: {}", total, e)))?;

    for (y, row) in frame.chunks_exact(line_size).take(height as usize).enumerate() {
        for (x, px) in row.chunks_exact(4).take(width as usize).enumerate() {
            // px[3] is alpha, which is not displayed
            points.push(ColoredPoint {
                x: x as u32,
                y: y as u32,
                r: px[0],
                g: px[1],
                b: px[2],
            });
        }
    }

    if points.len() != total {
        return Err(ViewerError::Decode(format!(
            "expected {} pixels, decoded {}",
            total,
            points.len()
        )));
    }

    Ok(DecodedImage {
        points,
        width,
        height,
    })
}

fn try_alloc_zeroed(len: usize) -> Result<Vec<u8>, ViewerError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| ViewerError::Decode(format!("cannot allocate {} byte frame: {}", len, e)))?;
    buf.resize(len, 0);
    Ok(buf)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Encode raw sample data as a PNG
    pub(crate) fn encode_png(
        width: u32,
        height: u32,
        color: png::ColorType,
        depth: png::BitDepth,
        data: &[u8],
    ) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(depth);
            if color == png::ColorType::Indexed {
                encoder.set_palette(vec![255, 0, 0, 0, 0, 255]);
                encoder.set_trns(vec![255, 128]);
            }
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    pub(crate) fn rgba_png(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
        encode_png(
            width,
            height,
            png::ColorType::Rgba,
            png::BitDepth::Eight,
            rgba,
        )
    }

    /// A width x height RGBA gradient so every pixel differs
    pub(crate) fn gradient(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x * 10) as u8, (y * 20) as u8, (x + y) as u8, 200]);
            }
        }
        data
    }

    #[test]
    fn decodes_full_row_major_grid() {
        let (w, h) = (7, 5);
        let image = decode_bytes(&rgba_png(w, h, &gradient(w, h))).unwrap();

        assert_eq!(image.dimensions(), (7, 5));
        assert_eq!(image.count(), 35);

        let mut seen = HashSet::new();
        for (i, p) in image.points().iter().enumerate() {
            assert_eq!(p.x, i as u32 % w);
            assert_eq!(p.y, i as u32 / w);
            assert!(seen.insert((p.x, p.y)), "duplicate point {:?}", p);
        }
        assert_eq!(seen.len(), 35);
    }

    #[test]
    fn copies_rgb_and_drops_alpha() {
        let data = [
            255, 0, 0, 255, // red
            0, 255, 0, 0, // transparent green
            0, 0, 255, 17, // blue
            255, 255, 255, 255, // white
        ];
        let image = decode_bytes(&rgba_png(2, 2, &data)).unwrap();

        let green = image.pixel_at(1, 0).unwrap();
        assert_eq!((green.r, green.g, green.b), (0, 255, 0));
        let blue = image.pixel_at(0, 1).unwrap();
        assert_eq!((blue.x, blue.y, blue.r, blue.g, blue.b), (0, 1, 0, 0, 255));
    }

    #[test]
    fn matches_image_crate_pixels() {
        let (w, h) = (6, 4);
        let bytes = rgba_png(w, h, &gradient(w, h));
        let image = decode_bytes(&bytes).unwrap();
        let reference = image::load_from_memory(&bytes).unwrap().to_rgba8();

        for p in image.points() {
            let px = reference.get_pixel(p.x, p.y);
            assert_eq!([p.r, p.g, p.b], [px[0], px[1], px[2]]);
        }
    }

    #[test]
    fn pixel_at_out_of_bounds_is_none() {
        let image = decode_bytes(&rgba_png(2, 3, &gradient(2, 3))).unwrap();
        assert!(image.pixel_at(2, 0).is_none());
        assert!(image.pixel_at(0, 3).is_none());
        assert_eq!(image.pixel_at(1, 2).map(|p| (p.x, p.y)), Some((1, 2)));
    }

    #[test]
    fn rejects_non_rgba_color_types() {
        let cases = [
            (png::ColorType::Grayscale, png::BitDepth::Eight, vec![0u8; 4]),
            (png::ColorType::GrayscaleAlpha, png::BitDepth::Eight, vec![0u8; 8]),
            (png::ColorType::Rgb, png::BitDepth::Eight, vec![0u8; 12]),
            (png::ColorType::Indexed, png::BitDepth::Eight, vec![0, 1, 1, 0]),
            (png::ColorType::Rgba, png::BitDepth::Sixteen, vec![0u8; 32]),
        ];

        for (color, depth, data) in cases {
            let bytes = encode_png(2, 2, color, depth, &data);
            match decode_bytes(&bytes) {
                Err(ViewerError::UnsupportedFormat {
                    color_type,
                    bit_depth,
                }) => {
                    assert_eq!(color_type, color);
                    assert_eq!(bit_depth, depth);
                }
                other => panic!("{:?}/{:?} should be unsupported, got {:?}", color, depth, other),
            }
        }
    }

    #[test]
    fn empty_input_fails_cleanly() {
        assert!(matches!(decode_bytes(&[]), Err(ViewerError::Decode(_))));
    }

    #[test]
    fn truncated_png_fails_cleanly() {
        let bytes = rgba_png(64, 64, &gradient(64, 64));
        for cut in [8, 20, 40, bytes.len() / 2] {
            let result = decode_bytes(&bytes[..cut]);
            assert!(
                matches!(result, Err(ViewerError::Decode(_))),
                "cut at {} gave {:?}",
                cut,
                result
            );
        }
    }

    #[test]
    fn rejects_other_formats() {
        let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";
        assert!(matches!(decode_bytes(gif), Err(ViewerError::Decode(_))));
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let path = Path::new("/nonexistent/pixview/missing.png");
        match decode(path) {
            Err(ViewerError::FileNotFound { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn decodes_from_disk() {
        let path = std::env::temp_dir().join(format!("pixview-decode-{}.png", std::process::id()));
        fs::write(&path, rgba_png(3, 2, &gradient(3, 2))).unwrap();

        let result = decode(&path);
        let _ = fs::remove_file(&path);

        let image = result.unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.count(), 6);
    }
}
