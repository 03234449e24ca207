use image::{GenericImageView, GrayImage, Luma, Rgb, Rgba, imageops};
use imageproc::{
    definitions::Image,
    map::{map_colors, map_colors2},
};
use tracing::debug;

use crate::{
    ColorKeyExt, TransparencyKey,
    cutout_kit::{
        contour::{
            BoundingBox, ContourExt, fill_contour_mask, find_external_contours, largest_contour,
        },
        morphology::{StructuringElement, close_mask},
    },
    error::RemoveBackgroundError,
    utils::validate_non_empty_image,
};

/// Brightness of the uniform background to strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BackgroundTone {
    /// Near-white background: intensity above the threshold is background
    #[default]
    Light,
    /// Near-black background: intensity below the threshold is background
    Dark,
}

/// Parameters of the background removal pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BackgroundRemovalConfig {
    /// Intensity cutoff separating background from foreground.
    pub threshold: u8,
    /// Which side of the cutoff is background.
    pub background: BackgroundTone,
    /// Box size `(width, height)` of the elliptical closing kernel.
    pub kernel_size: (u32, u32),
    /// Colour keyed to transparency after cropping.
    pub transparency_key: TransparencyKey,
}

impl Default for BackgroundRemovalConfig {
    fn default() -> Self {
        Self {
            threshold: 220,
            background: BackgroundTone::Light,
            kernel_size: (11, 11),
            transparency_key: TransparencyKey::Black,
        }
    }
}

impl BackgroundRemovalConfig {
    /// Preset for subjects photographed on a near-black backdrop.
    #[must_use]
    pub fn for_dark_background() -> Self {
        Self {
            threshold: 35,
            background: BackgroundTone::Dark,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_background(mut self, background: BackgroundTone) -> Self {
        self.background = background;
        self
    }

    #[must_use]
    pub const fn with_kernel_size(mut self, width: u32, height: u32) -> Self {
        self.kernel_size = (width, height);
        self
    }

    #[must_use]
    pub const fn with_transparency_key(mut self, key: TransparencyKey) -> Self {
        self.transparency_key = key;
        self
    }
}

/// Location of the subject within the source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Foreground {
    /// Full-size mask, 255 inside the filled silhouette and 0 elsewhere.
    pub mask: GrayImage,
    /// Bounding box of the silhouette's outer contour.
    pub bounds: BoundingBox,
}

/// Classifies each pixel as foreground (255) or background (0) by intensity.
#[must_use]
pub fn threshold_mask(gray: &GrayImage, threshold: u8, background: BackgroundTone) -> GrayImage {
    map_colors(gray, |Luma([intensity])| {
        let is_background = match background {
            BackgroundTone::Light => intensity > threshold,
            BackgroundTone::Dark => intensity < threshold,
        };
        Luma([if is_background { 0 } else { u8::MAX }])
    })
}

/// Finds the subject silhouette in a colour image.
///
/// The image is reduced to luma, thresholded, closed with an elliptical
/// kernel, and the external contour with the largest area is filled solid.
///
/// # Errors
///
/// * `RemoveBackgroundError::EmptyImage` - When the image has a zero dimension
/// * `RemoveBackgroundError::InvalidKernelSize` - When the kernel cannot be built
/// * `RemoveBackgroundError::NoForegroundDetected` - When no contour is found
pub fn locate_foreground(
    image: &Image<Rgb<u8>>,
    config: &BackgroundRemovalConfig,
) -> Result<Foreground, RemoveBackgroundError> {
    locate_foreground_impl(image, None, config)
}

/// Cuts the subject out of a colour image with a near-uniform background.
///
/// Pixels outside the filled silhouette are zeroed, the image is cropped to
/// the silhouette's bounding box, and a binary alpha channel is added by
/// keying out `config.transparency_key`.
///
/// # Errors
///
/// * `RemoveBackgroundError::EmptyImage` - When the image has a zero dimension
/// * `RemoveBackgroundError::InvalidKernelSize` - When the kernel cannot be built
/// * `RemoveBackgroundError::NoForegroundDetected` - When no contour is found
///
/// # Examples
/// ```no_run
/// use cutout_kit::{BackgroundRemovalConfig, remove_background};
/// use image::RgbImage;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let photo = RgbImage::new(640, 480);
/// let cutout = remove_background(&photo, &BackgroundRemovalConfig::default())?;
/// # Ok(())
/// # }
/// ```
pub fn remove_background(
    image: &Image<Rgb<u8>>,
    config: &BackgroundRemovalConfig,
) -> Result<Image<Rgba<u8>>, RemoveBackgroundError> {
    let foreground = locate_foreground(image, config)?;
    Ok(cut_out_impl(image, &foreground, config.transparency_key))
}

/// Trait providing contour-based background removal.
///
/// The source image is only read; every call allocates a fresh result.
pub trait RemoveBackgroundExt {
    /// Cuts the subject out and returns it cropped with a binary alpha channel.
    ///
    /// For RGBA input, fully transparent pixels always count as background, so
    /// running the removal again on its own output yields the same crop.
    ///
    /// # Errors
    ///
    /// * `RemoveBackgroundError::EmptyImage` - When the image has a zero dimension
    /// * `RemoveBackgroundError::InvalidKernelSize` - When the kernel cannot be built
    /// * `RemoveBackgroundError::NoForegroundDetected` - When no contour is found
    fn remove_background(
        &self,
        config: &BackgroundRemovalConfig,
    ) -> Result<Image<Rgba<u8>>, RemoveBackgroundError>;
}

impl RemoveBackgroundExt for Image<Rgb<u8>> {
    fn remove_background(
        &self,
        config: &BackgroundRemovalConfig,
    ) -> Result<Image<Rgba<u8>>, RemoveBackgroundError> {
        remove_background(self, config)
    }
}

impl RemoveBackgroundExt for Image<Rgba<u8>> {
    fn remove_background(
        &self,
        config: &BackgroundRemovalConfig,
    ) -> Result<Image<Rgba<u8>>, RemoveBackgroundError> {
        let color = map_colors(self, |Rgba([red, green, blue, _])| Rgb([red, green, blue]));
        let opaque = map_colors(self, |Rgba([_, _, _, alpha])| {
            Luma([if alpha == 0 { 0 } else { u8::MAX }])
        });

        let foreground = locate_foreground_impl(&color, Some(&opaque), config)?;
        Ok(cut_out_impl(&color, &foreground, config.transparency_key))
    }
}

fn locate_foreground_impl(
    image: &Image<Rgb<u8>>,
    opaque: Option<&GrayImage>,
    config: &BackgroundRemovalConfig,
) -> Result<Foreground, RemoveBackgroundError> {
    let (width, height) = image.dimensions();
    validate_non_empty_image(width, height, "RemoveBackground")
        .map_err(|_| RemoveBackgroundError::EmptyImage { width, height })?;

    let (kernel_width, kernel_height) = config.kernel_size;
    let element = StructuringElement::ellipse(kernel_width, kernel_height)?;

    let gray = imageops::grayscale(image);
    let mut binary = threshold_mask(&gray, config.threshold, config.background);
    if let Some(opaque) = opaque {
        binary = map_colors2(&binary, opaque, |Luma([fg]), Luma([alpha])| {
            Luma([fg.min(alpha)])
        });
    }

    let closed = close_mask(&binary, &element);
    let contours = find_external_contours(&closed)?;
    debug!(
        width,
        height,
        contours = contours.len(),
        "traced external contours"
    );

    let largest = largest_contour(&contours).ok_or(RemoveBackgroundError::NoForegroundDetected)?;
    let bounds = largest
        .bounding_rect()
        .ok_or(RemoveBackgroundError::NoForegroundDetected)?;
    debug!(area = largest.area(), ?bounds, "selected subject contour");

    Ok(Foreground {
        mask: fill_contour_mask(&closed, largest),
        bounds,
    })
}

/// Zeroes pixels outside the silhouette, crops to its bounds and keys out `key`.
fn cut_out_impl(
    image: &Image<Rgb<u8>>,
    foreground: &Foreground,
    key: TransparencyKey,
) -> Image<Rgba<u8>> {
    let masked = map_colors2(image, &foreground.mask, |pixel, Luma([inside])| {
        if inside == 0 { Rgb([0, 0, 0]) } else { pixel }
    });

    let BoundingBox {
        x,
        y,
        width,
        height,
    } = foreground.bounds;

    masked.view(x, y, width, height).to_image().key_color(key)
}
