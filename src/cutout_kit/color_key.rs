use image::{Rgb, Rgba};
use imageproc::{definitions::Image, map::map_colors};

/// Colour that is keyed out to full transparency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TransparencyKey {
    /// Pure black `(0, 0, 0)`, the fill left behind by background masking
    #[default]
    Black,
    /// Pure white `(255, 255, 255)`
    White,
}

impl TransparencyKey {
    /// The exact colour matched by this key.
    #[must_use]
    pub const fn color(self) -> Rgb<u8> {
        match self {
            Self::Black => Rgb([0, 0, 0]),
            Self::White => Rgb([u8::MAX, u8::MAX, u8::MAX]),
        }
    }

    #[inline]
    fn matches(self, [red, green, blue]: [u8; 3]) -> bool {
        self.color().0 == [red, green, blue]
    }
}

/// Alpha value of a pixel once keyed.
#[inline]
const fn keyed_alpha(transparent: bool) -> u8 {
    if transparent { 0 } else { u8::MAX }
}

/// Appends a binary alpha channel to an RGB image.
///
/// Every pixel whose three channels equal the key colour exactly becomes
/// fully transparent; all others are fully opaque. Interior pixels of the
/// subject that happen to match the key are keyed out as well.
///
/// # Examples
/// ```
/// use image::{Rgb, Rgba, RgbImage};
/// use cutout_kit::{TransparencyKey, key_color};
///
/// let mut image = RgbImage::new(2, 1);
/// image.put_pixel(1, 0, Rgb([10, 20, 30]));
///
/// let keyed = key_color(&image, TransparencyKey::Black);
/// assert_eq!(keyed.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
/// assert_eq!(keyed.get_pixel(1, 0), &Rgba([10, 20, 30, 255]));
/// ```
#[must_use]
pub fn key_color(image: &Image<Rgb<u8>>, key: TransparencyKey) -> Image<Rgba<u8>> {
    map_colors(image, |Rgb(channels)| {
        let [red, green, blue] = channels;
        Rgba([red, green, blue, keyed_alpha(key.matches(channels))])
    })
}

/// Trait providing colour keying for images.
pub trait ColorKeyExt {
    /// Produces an RGBA image whose alpha is 0 exactly where the colour channels match `key`.
    ///
    /// This consumes the original image. For RGBA input the previous alpha is discarded.
    fn key_color(self, key: TransparencyKey) -> Image<Rgba<u8>>;
}

/// Trait for re-deriving the alpha channel of existing RGBA images.
pub trait RekeyAlphaExt {
    /// Re-derives the alpha channel from the colour channels in-place.
    ///
    /// The colour channels are left untouched.
    fn rekey_mut(&mut self, key: TransparencyKey) -> &mut Self;
}

impl ColorKeyExt for Image<Rgb<u8>> {
    fn key_color(self, key: TransparencyKey) -> Image<Rgba<u8>> {
        key_color(&self, key)
    }
}

impl ColorKeyExt for Image<Rgba<u8>> {
    fn key_color(mut self, key: TransparencyKey) -> Image<Rgba<u8>> {
        self.rekey_mut(key);
        self
    }
}

impl RekeyAlphaExt for Image<Rgba<u8>> {
    fn rekey_mut(&mut self, key: TransparencyKey) -> &mut Self {
        self.pixels_mut().for_each(|pixel| {
            let Rgba([red, green, blue, _]) = *pixel;
            *pixel = Rgba([red, green, blue, keyed_alpha(key.matches([red, green, blue]))]);
        });
        self
    }
}

/// Returns true when every alpha value is either 0 or 255.
#[must_use]
pub fn is_binary_alpha(image: &Image<Rgba<u8>>) -> bool {
    image
        .pixels()
        .all(|Rgba([_, _, _, alpha])| *alpha == 0 || *alpha == u8::MAX)
}
