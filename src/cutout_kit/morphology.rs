use image::{GrayImage, Luma};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};
use itertools::iproduct;

use crate::{error::RemoveBackgroundError, utils::validate_kernel_side};

/// Elliptical structuring element used to close gaps in binary masks.
///
/// The element is rasterised row by row: for a kernel of `width x height`
/// with half-sizes `c = width / 2` and `r = height / 2`, row `dy` spans
/// `round(c * sqrt((r^2 - dy^2) / r^2))` pixels either side of the anchor.
/// The anchor sits at `(c, r)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    width: u32,
    height: u32,
    footprint: GrayImage,
}

impl StructuringElement {
    /// Builds an elliptical element inscribed in a `width x height` box.
    ///
    /// # Errors
    ///
    /// * `RemoveBackgroundError::InvalidKernelSize` - When either side is outside `1..=255`
    pub fn ellipse(width: u32, height: u32) -> Result<Self, RemoveBackgroundError> {
        validate_kernel_side(width, "StructuringElement")
            .and_then(|()| validate_kernel_side(height, "StructuringElement"))
            .map_err(|_| RemoveBackgroundError::InvalidKernelSize { width, height })?;

        Ok(Self {
            width,
            height,
            footprint: ellipse_footprint_impl(width, height),
        })
    }

    /// Kernel box size as `(width, height)`.
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels covered by the element.
    #[must_use]
    pub fn area(&self) -> usize {
        iproduct!(0..self.height, 0..self.width)
            .filter(|&(y, x)| self.footprint.get_pixel(x, y)[0] != 0)
            .count()
    }

    fn to_mask(&self) -> Mask {
        // Sides are at most 255, so both anchors fit in u8.
        Mask::from_image(&self.footprint, (self.width / 2) as u8, (self.height / 2) as u8)
    }
}

/// Rasterises the elliptical footprint: 255 inside, 0 outside.
fn ellipse_footprint_impl(width: u32, height: u32) -> GrayImage {
    let c = i64::from(width / 2);
    let r = i64::from(height / 2);
    let inv_r2 = if r == 0 { 0.0 } else { 1.0 / (r * r) as f64 };

    let mut footprint = GrayImage::new(width, height);
    for y in 0..height {
        let dy = i64::from(y) - r;
        if dy.abs() > r {
            continue;
        }
        let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as i64;
        let x_start = (c - dx).max(0);
        let x_end = (c + dx + 1).min(i64::from(width));
        for x in x_start..x_end {
            footprint.put_pixel(x as u32, y, Luma([u8::MAX]));
        }
    }
    footprint
}

/// Morphological closing (dilation followed by erosion) of a binary mask.
///
/// Neighbours outside the image are ignored by both passes, so foreground
/// lying within the kernel radius of the canvas edge may grow towards it.
#[must_use]
pub fn close_mask(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    let kernel = element.to_mask();
    let dilated = grayscale_dilate(mask, &kernel);
    grayscale_erode(&dilated, &kernel)
}

/// Trait providing morphological closing on binary masks.
pub trait MorphCloseExt {
    /// Closes small gaps between foreground fragments and removes speckle holes.
    ///
    /// This consumes the original mask.
    fn close(self, element: &StructuringElement) -> Self
    where
        Self: Sized;
}

impl MorphCloseExt for GrayImage {
    fn close(self, element: &StructuringElement) -> Self {
        close_mask(&self, element)
    }
}
