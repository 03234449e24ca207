//! End-to-end flow: fetch or take decoded images, cut each subject out once,
//! repeat the cutouts and composite them into a collage.

use image::{Rgb, Rgba};
use imageproc::definitions::Image;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    cutout_kit::{
        collage::{CollageOptions, make_collage, repeat_images},
        remove_background::{BackgroundRemovalConfig, remove_background},
        source::ImageSource,
    },
    error::{CollageError, PipelineError},
};

/// A decoded input image and how many times its cutout appears in the collage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageSource {
    pub image: Image<Rgb<u8>>,
    pub repeats: usize,
}

impl CollageSource {
    #[must_use]
    pub const fn new(image: Image<Rgb<u8>>, repeats: usize) -> Self {
        Self { image, repeats }
    }
}

/// An image to fetch and how many times its cutout appears in the collage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollageRequest {
    pub url: String,
    pub repeats: usize,
}

impl CollageRequest {
    #[must_use]
    pub fn new(url: impl Into<String>, repeats: usize) -> Self {
        Self {
            url: url.into(),
            repeats,
        }
    }
}

/// Cuts out every source image, in input order.
///
/// With the `rayon` feature the removals run in parallel; the returned
/// cutouts are still ordered like `sources`.
///
/// # Errors
///
/// * `PipelineError::RemoveBackground` - For the first input whose removal fails
pub fn cut_out_all(
    sources: &[CollageSource],
    config: &BackgroundRemovalConfig,
) -> Result<Vec<Image<Rgba<u8>>>, PipelineError> {
    let cut_out = |(index, source): (usize, &CollageSource)| {
        remove_background(&source.image, config)
            .map_err(|source| PipelineError::RemoveBackground { index, source })
    };

    #[cfg(feature = "rayon")]
    let cutouts = sources.par_iter().enumerate().map(cut_out).collect();
    #[cfg(not(feature = "rayon"))]
    let cutouts = sources.iter().enumerate().map(cut_out).collect();

    cutouts
}

/// Builds a collage from decoded images.
///
/// Each source's background is removed once, its cutout is repeated
/// `repeats` times, and the whole sequence is composited left to right.
///
/// # Errors
///
/// * `PipelineError::NoSources` - When `sources` is empty
/// * `PipelineError::Collage` - When a repeat count is zero or composition fails
/// * `PipelineError::RemoveBackground` - When an input has no detectable subject
pub fn build_collage(
    sources: &[CollageSource],
    config: &BackgroundRemovalConfig,
    options: &CollageOptions,
) -> Result<Image<Rgb<u8>>, PipelineError> {
    if sources.is_empty() {
        return Err(PipelineError::NoSources);
    }
    if let Some(source) = sources.iter().find(|source| source.repeats == 0) {
        return Err(CollageError::InvalidRepeatCount {
            count: source.repeats,
        }
        .into());
    }

    let cutouts = cut_out_all(sources, config)?;

    let mut sequence = Vec::with_capacity(sources.iter().map(|source| source.repeats).sum());
    for (cutout, source) in cutouts.iter().zip(sources) {
        sequence.extend(repeat_images(std::slice::from_ref(cutout), source.repeats)?);
    }
    debug!(
        inputs = sources.len(),
        layers = sequence.len(),
        "cut out all inputs"
    );

    Ok(make_collage(&sequence, options)?)
}

/// Fetches every requested image and builds a collage from them.
///
/// Requests with an empty URL are skipped. Fetch failures are returned
/// unchanged and stop the pipeline before any processing.
///
/// # Errors
///
/// * `PipelineError::Fetch` - When an image cannot be fetched or decoded
/// * Any error of [`build_collage`]
pub fn fetch_and_build<S: ImageSource>(
    source: &S,
    requests: &[CollageRequest],
    config: &BackgroundRemovalConfig,
    options: &CollageOptions,
) -> Result<Image<Rgb<u8>>, PipelineError> {
    let mut sources = Vec::with_capacity(requests.len());
    for (index, request) in requests.iter().enumerate() {
        if request.url.trim().is_empty() {
            info!(index, "skipping request without URL");
            continue;
        }
        let image = source.fetch(&request.url)?;
        sources.push(CollageSource::new(image, request.repeats));
    }

    build_collage(&sources, config, options)
}
