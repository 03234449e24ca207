use image::{ImageBuffer, Pixel, imageops};
use imageproc::definitions::Image;

use crate::error::PaddingError;

/// Per-side border widths in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Border {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Border {
    /// Border of the same width on every side.
    #[must_use]
    pub const fn uniform(width: u32) -> Self {
        Self {
            top: width,
            bottom: width,
            left: width,
            right: width,
        }
    }

    /// Border with only left and right columns.
    #[must_use]
    pub const fn horizontal(left: u32, right: u32) -> Self {
        Self {
            top: 0,
            bottom: 0,
            left,
            right,
        }
    }

    /// Border with only top and bottom rows.
    #[must_use]
    pub const fn vertical(top: u32, bottom: u32) -> Self {
        Self {
            top,
            bottom,
            left: 0,
            right: 0,
        }
    }

    /// Size of an image of `size` once this border is added.
    ///
    /// # Errors
    ///
    /// * `PaddingError::DimensionOverflow` - When either side would exceed `u32::MAX`
    pub fn padded_size(&self, size: (u32, u32)) -> Result<(u32, u32), PaddingError> {
        let (width, height) = size;
        let padded_width = width
            .checked_add(self.left)
            .and_then(|w| w.checked_add(self.right));
        let padded_height = height
            .checked_add(self.top)
            .and_then(|h| h.checked_add(self.bottom));

        padded_width
            .zip(padded_height)
            .ok_or(PaddingError::DimensionOverflow {
                width,
                height,
                border: (self.top, self.bottom, self.left, self.right),
            })
    }
}

/// Vertical placement of an image inside a taller canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VerticalAlign {
    /// Flush with the top edge
    #[default]
    Top,
    /// Centred, extra odd row at the bottom
    Center,
    /// Flush with the bottom edge
    Bottom,
}

impl VerticalAlign {
    /// Border rows needed to place an image of `height` into `target_height`.
    ///
    /// # Errors
    ///
    /// * `PaddingError::TargetHeightTooSmall` - When `target_height < height`
    pub fn border_for(self, height: u32, target_height: u32) -> Result<Border, PaddingError> {
        let slack = target_height
            .checked_sub(height)
            .ok_or(PaddingError::TargetHeightTooSmall {
                height,
                target: target_height,
            })?;

        let top = match self {
            Self::Top => 0,
            Self::Center => slack / 2,
            Self::Bottom => slack,
        };

        Ok(Border::vertical(top, slack - top))
    }
}

/// Surrounds an image with a constant-colour border.
///
/// # Arguments
///
/// * `image` - Original image
/// * `border` - Border widths for each side
/// * `fill` - Colour of the border pixels
///
/// # Returns
///
/// Padded image with the original placed at `(border.left, border.top)`
///
/// # Errors
///
/// * `PaddingError::DimensionOverflow` - When the padded size overflows `u32`
///
/// # Examples
/// ```
/// use image::{Rgba, RgbaImage};
/// use cutout_kit::{Border, add_border};
///
/// let image = RgbaImage::from_pixel(10, 10, Rgba([200, 10, 10, 255]));
/// let padded = add_border(&image, Border::horizontal(5, 15), Rgba([0, 0, 0, 0])).unwrap();
/// assert_eq!(padded.dimensions(), (30, 10));
/// assert_eq!(padded.get_pixel(5, 0), &Rgba([200, 10, 10, 255]));
/// ```
pub fn add_border<P>(image: &Image<P>, border: Border, fill: P) -> Result<Image<P>, PaddingError>
where
    P: Pixel,
{
    let (width, height) = border.padded_size(image.dimensions())?;

    if border == Border::default() {
        return Ok(image.clone());
    }

    let mut out = ImageBuffer::from_pixel(width, height, fill);
    imageops::replace(
        &mut out,
        image,
        i64::from(border.left),
        i64::from(border.top),
    );

    Ok(out)
}

/// Pads an image with rows so its height becomes `target_height`.
///
/// # Errors
///
/// * `PaddingError::TargetHeightTooSmall` - When the image is taller than `target_height`
pub fn align_to_height<P>(
    image: &Image<P>,
    target_height: u32,
    align: VerticalAlign,
    fill: P,
) -> Result<Image<P>, PaddingError>
where
    P: Pixel,
{
    let border = align.border_for(image.height(), target_height)?;
    add_border(image, border, fill)
}

/// Trait that provides border padding operations.
///
/// Note: This operation changes the image dimensions, so there is no `_mut` variant
/// available. The algorithm creates a new image with different dimensions.
pub trait BorderExt<P: Pixel> {
    /// Surrounds the image with a constant-colour border.
    ///
    /// This consumes the original image.
    ///
    /// # Examples
    /// ```no_run
    /// use cutout_kit::{Border, BorderExt, Image};
    /// use image::Rgb;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image: Image<Rgb<u8>> = Image::new(10, 10);
    /// let padded = image.add_border(Border::horizontal(2, 4), Rgb([0, 0, 0]))?;
    /// # Ok(())
    /// # }
    /// ```
    fn add_border(self, border: Border, fill: P) -> Result<Self, PaddingError>
    where
        Self: Sized;

    /// Pads rows so the image reaches `target_height`.
    ///
    /// This consumes the original image.
    fn align_to_height(
        self,
        target_height: u32,
        align: VerticalAlign,
        fill: P,
    ) -> Result<Self, PaddingError>
    where
        Self: Sized;
}

impl<P: Pixel> BorderExt<P> for Image<P> {
    fn add_border(self, border: Border, fill: P) -> Result<Self, PaddingError> {
        if border == Border::default() {
            return Ok(self);
        }
        add_border(&self, border, fill)
    }

    fn align_to_height(
        self,
        target_height: u32,
        align: VerticalAlign,
        fill: P,
    ) -> Result<Self, PaddingError> {
        let border = align.border_for(self.height(), target_height)?;
        self.add_border(border, fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use image::{Rgb, Rgba};
    use itertools::iproduct;

    #[test]
    fn add_border_with_horizontal_border_places_image_at_left_offset() {
        let image = create_test_rgb_image(); // 2x2 image
        let fill = Rgb([0, 0, 0]);

        let padded = add_border(&image, Border::horizontal(3, 1), fill).unwrap();

        assert_eq!(padded.dimensions(), (6, 2));
        for (x, y) in iproduct!(0..2, 0..2) {
            assert_eq!(padded.get_pixel(x + 3, y), image.get_pixel(x, y));
        }
        for y in 0..2 {
            assert_eq!(padded.get_pixel(0, y), &fill);
            assert_eq!(padded.get_pixel(2, y), &fill);
            assert_eq!(padded.get_pixel(5, y), &fill);
        }
    }

    #[test]
    fn add_border_with_transparent_fill_zeroes_every_channel() {
        let image = solid_rgba_image(2, 2, Rgba([9, 9, 9, 255]));

        let padded = image
            .add_border(Border::uniform(1), Rgba([0, 0, 0, 0]))
            .unwrap();

        assert_eq!(padded.dimensions(), (4, 4));
        assert_eq!(padded.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(padded.get_pixel(3, 3), &Rgba([0, 0, 0, 0]));
        assert_eq!(padded.get_pixel(1, 1), &Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn add_border_with_empty_border_returns_same_image() {
        let image = create_test_rgb_image();

        let padded = add_border(&image, Border::default(), Rgb([1, 2, 3])).unwrap();

        assert_eq!(padded, image);
    }

    #[test]
    fn add_border_with_overflowing_size_returns_error() {
        let image = create_test_rgb_image();

        let result = add_border(&image, Border::horizontal(u32::MAX, 0), Rgb([0, 0, 0]));

        assert!(matches!(
            result.unwrap_err(),
            PaddingError::DimensionOverflow { width: 2, .. }
        ));
    }

    #[test]
    fn border_for_with_each_alignment_splits_slack() {
        assert_eq!(
            VerticalAlign::Top.border_for(4, 9).unwrap(),
            Border::vertical(0, 5)
        );
        assert_eq!(
            VerticalAlign::Center.border_for(4, 9).unwrap(),
            Border::vertical(2, 3)
        );
        assert_eq!(
            VerticalAlign::Bottom.border_for(4, 9).unwrap(),
            Border::vertical(5, 0)
        );
    }

    #[test]
    fn border_for_with_short_target_returns_error() {
        assert_eq!(
            VerticalAlign::Center.border_for(10, 4).unwrap_err(),
            PaddingError::TargetHeightTooSmall {
                height: 10,
                target: 4
            }
        );
    }

    #[test]
    fn align_to_height_with_bottom_alignment_pads_above() {
        let image = solid_rgba_image(3, 2, Rgba([50, 60, 70, 255]));

        let aligned =
            align_to_height(&image, 5, VerticalAlign::Bottom, Rgba([0, 0, 0, 0])).unwrap();

        assert_eq!(aligned.dimensions(), (3, 5));
        assert_eq!(aligned.get_pixel(0, 2), &Rgba([0, 0, 0, 0]));
        assert_eq!(aligned.get_pixel(0, 3), &Rgba([50, 60, 70, 255]));
        assert_eq!(aligned.get_pixel(2, 4), &Rgba([50, 60, 70, 255]));
    }
}
