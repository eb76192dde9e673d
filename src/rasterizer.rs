// Rasterizer module
// Drawing primitives built on Surface::set_pixel

use crate::image_loader::DecodedImage;
use crate::surface::Surface;
use log::debug;

/// A signed drawing coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Inclusive walk from `from` to `to`, stepping toward `to`
fn span(from: i32, to: i32) -> impl Iterator<Item = i32> {
    let step: i64 = if to >= from { 1 } else { -1 };
    let len = (i64::from(to) - i64::from(from)).unsigned_abs();
    (0..=len).map(move |i| (i64::from(from) + step * i as i64) as i32)
}

/// Fill the rectangle spanned by two opposite corners, both inclusive
pub fn draw_rectangle(surface: &mut Surface, corner0: Point, corner1: Point, r: u8, g: u8, b: u8) {
    for x in span(corner0.x, corner1.x) {
        for y in span(corner0.y, corner1.y) {
            surface.set_pixel(x, y, r, g, b);
        }
    }
}

/// Copy every point of `image` onto `surface`, offset by `origin`
pub fn paste_image(surface: &mut Surface, image: &DecodedImage, origin: Point) {
    debug!(
        "Pasting {} points ({}x{}) at ({}, {}) onto {}x{} surface",
        image.count(),
        image.width(),
        image.height(),
        origin.x,
        origin.y,
        surface.width(),
        surface.height()
    );

    for p in image.points() {
        let x = i32::try_from(p.x).ok().and_then(|x| x.checked_add(origin.x));
        let y = i32::try_from(p.y).ok().and_then(|y| y.checked_add(origin.y));
        // Unrepresentable destinations are outside the surface anyway
        if let (Some(x), Some(y)) = (x, y) {
            surface.set_pixel(x, y, p.r, p.g, p.b);
        }
    }
}
