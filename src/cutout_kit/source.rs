use image::Rgb;
use imageproc::definitions::Image;

use crate::error::FetchError;

/// Provider of decoded colour images, addressed by URL.
///
/// Implementations never retry; a failure is reported once and left to the caller.
pub trait ImageSource {
    /// Fetches and decodes the image at `url` into 8-bit RGB.
    ///
    /// # Errors
    ///
    /// * `FetchError::Request` - When the transport fails
    /// * `FetchError::Status` - When the server rejects the request
    /// * `FetchError::Decode` - When the payload is not a supported image
    fn fetch(&self, url: &str) -> Result<Image<Rgb<u8>>, FetchError>;
}

impl<S: ImageSource + ?Sized> ImageSource for &S {
    fn fetch(&self, url: &str) -> Result<Image<Rgb<u8>>, FetchError> {
        (**self).fetch(url)
    }
}

/// Decodes an encoded image (PNG, JPEG or WebP) into 8-bit RGB.
///
/// Any alpha channel in the source is dropped.
///
/// # Errors
///
/// * `FetchError::Decode` - When the bytes are not a supported image
pub fn decode_image(bytes: &[u8]) -> Result<Image<Rgb<u8>>, FetchError> {
    Ok(image::load_from_memory(bytes)?.into_rgb8())
}

/// Image source backed by a blocking HTTP client.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct HttpImageSource {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpImageSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a preconfigured client (timeouts, proxies, headers).
    #[must_use]
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
impl ImageSource for HttpImageSource {
    fn fetch(&self, url: &str) -> Result<Image<Rgb<u8>>, FetchError> {
        let request_error = |err: reqwest::Error| FetchError::Request {
            url: url.to_owned(),
            message: err.to_string(),
        };

        let response = self.client.get(url).send().map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(request_error)?;
        tracing::debug!(url, bytes = bytes.len(), "fetched image");
        decode_image(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn encode_png(image: Image<Rgb<u8>>) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decode_image_with_png_bytes_returns_rgb_pixels() {
        let original = create_test_rgb_image();

        let decoded = decode_image(&encode_png(original.clone())).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn decode_image_with_rgba_png_drops_alpha() {
        let rgba = solid_rgba_image(3, 2, image::Rgba([10, 20, 30, 0]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(rgba)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let decoded = decode_image(&bytes).unwrap();

        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1), &Rgb([10, 20, 30]));
    }

    #[test]
    fn decode_image_with_garbage_returns_decode_error() {
        let result = decode_image(b"definitely not an image");

        assert!(matches!(result, Err(FetchError::Decode(_))));
    }
}
