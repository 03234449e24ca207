//! Shared fixtures for unit tests.

use image::{Rgb, Rgba};
use imageproc::definitions::Image;
use itertools::iproduct;

/// Creates a 2x2 RGB image with four distinct colours.
pub fn create_test_rgb_image() -> Image<Rgb<u8>> {
    let mut image: Image<Rgb<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgb([255, 0, 0]));
    image.put_pixel(1, 0, Rgb([0, 255, 0]));
    image.put_pixel(0, 1, Rgb([0, 0, 255]));
    image.put_pixel(1, 1, Rgb([128, 128, 128]));
    image
}

/// Creates an RGBA image filled with one colour.
pub fn solid_rgba_image(width: u32, height: u32, color: Rgba<u8>) -> Image<Rgba<u8>> {
    Image::from_pixel(width, height, color)
}

/// Creates an RGB image of `background` with a `foreground` rectangle at `(x, y, w, h)`.
pub fn product_on_background(
    size: (u32, u32),
    rect: (u32, u32, u32, u32),
    background: Rgb<u8>,
    foreground: Rgb<u8>,
) -> Image<Rgb<u8>> {
    let (width, height) = size;
    let (x, y, w, h) = rect;
    let mut image = Image::from_pixel(width, height, background);
    for (px, py) in iproduct!(x..x + w, y..y + h) {
        image.put_pixel(px, py, foreground);
    }
    image
}

/// Creates a fully opaque RGBA block of one colour, the shape of a clean cutout.
pub fn opaque_cutout(width: u32, height: u32, color: Rgb<u8>) -> Image<Rgba<u8>> {
    let Rgb([red, green, blue]) = color;
    solid_rgba_image(width, height, Rgba([red, green, blue, u8::MAX]))
}
