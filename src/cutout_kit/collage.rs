use std::borrow::Cow;

use image::{Rgb, Rgba};
use imageproc::{
    definitions::Image,
    map::{map_colors, map_colors2},
};
use tracing::debug;

use crate::{
    cutout_kit::{
        color_key::{RekeyAlphaExt, TransparencyKey, is_binary_alpha},
        padding::{Border, BorderExt, VerticalAlign, add_border},
    },
    error::{CollageError, PaddingError},
    utils::{validate_non_empty_image, validate_unit_fraction},
};

/// Fully zeroed pixel used for the collage canvas padding.
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Parameters of collage composition.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CollageOptions {
    /// Fraction of each image's width covered by the next image, in `[0, 1)`.
    pub overlap: f64,
    /// How to reconcile inputs of different heights. `None` rejects them.
    pub vertical_align: Option<VerticalAlign>,
}

impl Default for CollageOptions {
    fn default() -> Self {
        Self {
            overlap: 0.3,
            vertical_align: None,
        }
    }
}

impl CollageOptions {
    #[must_use]
    pub const fn with_overlap(mut self, overlap: f64) -> Self {
        self.overlap = overlap;
        self
    }

    #[must_use]
    pub const fn with_vertical_align(mut self, align: VerticalAlign) -> Self {
        self.vertical_align = Some(align);
        self
    }
}

/// Horizontal step from one image to the next: `(1 - overlap) * width`,
/// rounded half to even.
#[inline]
fn step_for_impl(width: u32, overlap: f64) -> u32 {
    // The product lies in [0, width], so the cast cannot truncate.
    ((1.0 - overlap) * f64::from(width)).round_ties_even() as u32
}

/// Left offsets of each image on the collage canvas.
///
/// Image `i + 1` starts `(1 - overlap) * width_i` pixels after image `i`.
/// With equal widths this is `i * step` for every image.
///
/// # Errors
///
/// * `CollageError::InvalidOverlap` - When `overlap` is outside `[0, 1)`
/// * `CollageError::Padding` - When an offset overflows `u32`
pub fn horizontal_offsets(widths: &[u32], overlap: f64) -> Result<Vec<u32>, CollageError> {
    validate_overlap_impl(overlap)?;

    let mut offsets = Vec::with_capacity(widths.len());
    let mut x = 0u32;
    for (i, &width) in widths.iter().enumerate() {
        offsets.push(x);
        if i + 1 < widths.len() {
            x = x
                .checked_add(step_for_impl(width, overlap))
                .ok_or(PaddingError::DimensionOverflow {
                    width: x,
                    height: 0,
                    border: (0, 0, 0, width),
                })?;
        }
    }
    Ok(offsets)
}

/// Overlays `front` on `back` with a hard alpha cutover.
///
/// Where the front pixel's alpha is 0 the back pixel (colour and alpha) shows
/// through; everywhere else the front pixel wins. No intermediate alpha is
/// ever produced from binary inputs.
///
/// # Errors
///
/// * `CollageError::LayerSizeMismatch` - When the layers differ in size
pub fn blend_binary(
    front: &Image<Rgba<u8>>,
    back: &Image<Rgba<u8>>,
) -> Result<Image<Rgba<u8>>, CollageError> {
    if front.dimensions() != back.dimensions() {
        return Err(CollageError::LayerSizeMismatch {
            front: front.dimensions(),
            back: back.dimensions(),
        });
    }

    Ok(map_colors2(front, back, |front_pixel, back_pixel| {
        if front_pixel[3] == 0 {
            back_pixel
        } else {
            front_pixel
        }
    }))
}

/// Repeats every image `count` times in a row, preserving input order.
///
/// # Errors
///
/// * `CollageError::InvalidRepeatCount` - When `count` is zero
pub fn repeat_images(
    images: &[Image<Rgba<u8>>],
    count: usize,
) -> Result<Vec<Image<Rgba<u8>>>, CollageError> {
    if count == 0 {
        return Err(CollageError::InvalidRepeatCount { count });
    }

    Ok(images
        .iter()
        .flat_map(|image| std::iter::repeat_n(image, count))
        .cloned()
        .collect())
}

/// Composites cutouts into one overlapping horizontal strip.
///
/// Each image is padded with fully zeroed columns so that image `i` sits at
/// its offset on a shared canvas. The padded layers are then blended back to
/// front: the last image starts as the composite, and the composite is laid
/// over each earlier image in turn. Later images therefore end up on top.
/// After every blend, pure black pixels of the composite are re-keyed as
/// transparent so the padding of upper layers never hides the layers below.
/// The result is the composite's colour with the alpha channel dropped.
///
/// # Errors
///
/// * `CollageError::InvalidOverlap` - When the overlap is outside `[0, 1)`
/// * `CollageError::EmptyImageList` - When `images` is empty
/// * `CollageError::EmptyImage` - When an image has a zero dimension
/// * `CollageError::NonBinaryAlpha` - When an image has alpha other than 0 or 255
/// * `CollageError::DimensionMismatch` - When heights differ and no alignment is set
/// * `CollageError::Padding` - When the canvas size overflows
///
/// # Examples
/// ```
/// use image::{Rgba, RgbaImage};
/// use cutout_kit::{CollageOptions, make_collage};
///
/// let tile = RgbaImage::from_pixel(100, 100, Rgba([30, 60, 90, 255]));
/// let images = vec![tile.clone(), tile.clone(), tile];
///
/// let collage = make_collage(&images, &CollageOptions::default().with_overlap(0.5)).unwrap();
/// assert_eq!(collage.dimensions(), (200, 100));
/// ```
pub fn make_collage(
    images: &[Image<Rgba<u8>>],
    options: &CollageOptions,
) -> Result<Image<Rgb<u8>>, CollageError> {
    validate_overlap_impl(options.overlap)?;
    if images.is_empty() {
        return Err(CollageError::EmptyImageList);
    }
    for (index, image) in images.iter().enumerate() {
        let (width, height) = image.dimensions();
        validate_non_empty_image(width, height, "Collage").map_err(|_| CollageError::EmptyImage {
            index,
            width,
            height,
        })?;
        if !is_binary_alpha(image) {
            return Err(CollageError::NonBinaryAlpha { index });
        }
    }

    let layers = reconcile_heights_impl(images, options.vertical_align)?;
    let widths: Vec<u32> = layers.iter().map(|layer| layer.width()).collect();
    let offsets = horizontal_offsets(&widths, options.overlap)?;

    let canvas_width = offsets
        .iter()
        .zip(&widths)
        .map(|(&x, &width)| x.checked_add(width))
        .try_fold(0u32, |acc, right| right.map(|right| acc.max(right)))
        .ok_or(PaddingError::DimensionOverflow {
            width: widths.iter().copied().max().unwrap_or(0),
            height: layers[0].height(),
            border: (0, 0, offsets.last().copied().unwrap_or(0), 0),
        })?;

    debug!(
        count = layers.len(),
        canvas_width,
        canvas_height = layers[0].height(),
        overlap = options.overlap,
        "compositing collage"
    );

    let mut padded = layers
        .into_iter()
        .zip(offsets)
        .map(|(layer, x)| {
            let right = canvas_width - x - layer.width();
            layer.into_owned().add_border(Border::horizontal(x, right), TRANSPARENT)
        })
        .collect::<Result<Vec<_>, PaddingError>>()?;

    let mut composite = padded.pop().ok_or(CollageError::EmptyImageList)?;
    for back in padded.iter().rev() {
        composite = blend_binary(&composite, back)?;
        composite.rekey_mut(TransparencyKey::Black);
    }

    Ok(flatten_impl(&composite))
}

/// Builds a collage of one image repeated `count` times.
///
/// # Errors
///
/// * `CollageError::InvalidRepeatCount` - When `count` is zero
/// * Any error of [`make_collage`]
pub fn make_collage_repeated(
    image: &Image<Rgba<u8>>,
    count: usize,
    options: &CollageOptions,
) -> Result<Image<Rgb<u8>>, CollageError> {
    let images = repeat_images(std::slice::from_ref(image), count)?;
    make_collage(&images, options)
}

/// Trait providing collage composition over a sequence of cutouts.
pub trait CollageExt {
    /// Composites the cutouts left to right into one overlapping strip.
    ///
    /// # Errors
    ///
    /// See [`make_collage`].
    fn make_collage(&self, options: &CollageOptions) -> Result<Image<Rgb<u8>>, CollageError>;
}

impl CollageExt for [Image<Rgba<u8>>] {
    fn make_collage(&self, options: &CollageOptions) -> Result<Image<Rgb<u8>>, CollageError> {
        make_collage(self, options)
    }
}

#[inline]
fn validate_overlap_impl(overlap: f64) -> Result<(), CollageError> {
    validate_unit_fraction(overlap, "Collage")
        .map_err(|_| CollageError::InvalidOverlap { overlap })
}

/// Brings every image to a common height, or rejects the set when no alignment is requested.
fn reconcile_heights_impl(
    images: &[Image<Rgba<u8>>],
    align: Option<VerticalAlign>,
) -> Result<Vec<Cow<'_, Image<Rgba<u8>>>>, CollageError> {
    let first_height = images[0].height();

    let Some(align) = align else {
        return images
            .iter()
            .enumerate()
            .map(|(index, image)| {
                if image.height() == first_height {
                    Ok(Cow::Borrowed(image))
                } else {
                    Err(CollageError::DimensionMismatch {
                        index,
                        expected: (image.width(), first_height),
                        actual: image.dimensions(),
                    })
                }
            })
            .collect();
    };

    let target = images
        .iter()
        .map(|image| image.height())
        .max()
        .unwrap_or(first_height);

    images
        .iter()
        .map(|image| {
            if image.height() == target {
                Ok(Cow::Borrowed(image))
            } else {
                let border = align.border_for(image.height(), target)?;
                Ok(Cow::Owned(add_border(image, border, TRANSPARENT)?))
            }
        })
        .collect()
}

/// Drops the alpha channel and keeps every pixel's colour.
fn flatten_impl(image: &Image<Rgba<u8>>) -> Image<Rgb<u8>> {
    map_colors(image, |Rgba([red, green, blue, _])| Rgb([red, green, blue]))
}
