//! # cutout-kit
//!
//! A Rust library for cutting product shots out of plain backgrounds and
//! compositing the cutouts into overlapping collages.
//!
//! This crate provides the following operations:
//!
//! - **Background Removal**: Thresholding, elliptical closing and contour filling isolate the
//!   largest subject, which is cropped and colour-keyed into a binary-alpha cutout
//! - **Colour Keying**: Appends a binary alpha channel that hides pure black or pure white
//! - **Morphology and Contours**: Elliptical structuring elements, closing, external contour
//!   tracing, contour areas and bounding boxes
//! - **Padding**: Zero borders and vertical alignment of images to a shared height
//! - **Collage**: Overlapping horizontal strips with back-to-front binary alpha blending
//! - **Pipeline**: Fetch, cut out, repeat and composite in one call
//!
//! ## Example Usage
//!
//! ```no_run
//! use cutout_kit::{
//!     BackgroundRemovalConfig, CollageExt, CollageOptions, RemoveBackgroundExt, TransparencyKey,
//! };
//! use image::Rgb;
//! use imageproc::definitions::Image;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BackgroundRemovalConfig::default().with_transparency_key(TransparencyKey::Black);
//!
//! let shoe: Image<Rgb<u8>> = image::open("shoe.jpg")?.into_rgb8();
//! let bag: Image<Rgb<u8>> = image::open("bag.jpg")?.into_rgb8();
//! let cutouts = vec![shoe.remove_background(&config)?, bag.remove_background(&config)?];
//!
//! let collage = cutouts.make_collage(&CollageOptions::default().with_overlap(0.3))?;
//! collage.save("collage.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `serde`: Enables serialization support for configuration types (optional)
//! - `rayon`: Removes backgrounds of pipeline inputs in parallel (optional)
//! - `http`: Provides [`HttpImageSource`], a blocking HTTP image fetcher (optional)

mod cutout_kit;
mod error;
mod utils;

#[cfg(test)]
mod test_utils;

pub use cutout_kit::collage::{
    CollageExt, CollageOptions, blend_binary, horizontal_offsets, make_collage,
    make_collage_repeated, repeat_images,
};
pub use cutout_kit::color_key::{
    ColorKeyExt, RekeyAlphaExt, TransparencyKey, is_binary_alpha, key_color,
};
pub use cutout_kit::contour::{
    BoundingBox, ContourExt, fill_contour_mask, find_external_contours, largest_contour,
};
pub use cutout_kit::morphology::{MorphCloseExt, StructuringElement, close_mask};
pub use cutout_kit::padding::{Border, BorderExt, VerticalAlign, add_border, align_to_height};
pub use cutout_kit::pipeline::{
    CollageRequest, CollageSource, build_collage, cut_out_all, fetch_and_build,
};
pub use cutout_kit::remove_background::{
    BackgroundRemovalConfig, BackgroundTone, Foreground, RemoveBackgroundExt, locate_foreground,
    remove_background, threshold_mask,
};
#[cfg(feature = "http")]
pub use cutout_kit::source::HttpImageSource;
pub use cutout_kit::source::{ImageSource, decode_image};
pub use error::{
    CollageError, FetchError, PaddingError, PipelineError, RemoveBackgroundError,
};

// Re-export imageproc::definitions::Image for convenience
pub use imageproc::definitions::Image;
