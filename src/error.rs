use thiserror::Error;

/// Errors raised while turning a colour image into a transparent cutout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoveBackgroundError {
    /// The input image has a zero dimension.
    #[error("Image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// The structuring element cannot be built from the requested size.
    #[error("Invalid kernel size {width}x{height}: each side must be in 1..=255")]
    InvalidKernelSize { width: u32, height: u32 },

    /// No foreground region survived thresholding and closing.
    #[error("No foreground detected: the image has no contour to cut out")]
    NoForegroundDetected,

    #[error(transparent)]
    Padding(#[from] PaddingError),
}

/// Errors raised by border padding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaddingError {
    /// The padded image would not fit in `u32` dimensions.
    #[error("Padded dimensions overflow: {width}x{height} plus border {border:?}")]
    DimensionOverflow {
        width: u32,
        height: u32,
        border: (u32, u32, u32, u32),
    },

    /// The target height is smaller than the image being aligned.
    #[error("Target height ({target}) must be at least the image height ({height})")]
    TargetHeightTooSmall { height: u32, target: u32 },
}

/// Errors raised while compositing cutouts into a collage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollageError {
    /// Overlap fraction outside `[0, 1)` or not finite.
    #[error("Overlap must be in [0, 1), got {overlap}")]
    InvalidOverlap { overlap: f64 },

    /// Repeat count below one.
    #[error("Repeat count must be at least 1, got {count}")]
    InvalidRepeatCount { count: usize },

    /// No images were handed to the collage.
    #[error("Collage requires at least one image")]
    EmptyImageList,

    /// An image has a zero dimension.
    #[error("Image {index} has zero dimensions ({width}x{height})")]
    EmptyImage { index: usize, width: u32, height: u32 },

    /// Heights differ and no vertical alignment was requested.
    #[error("Image {index} dimensions cannot be reconciled: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        index: usize,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Two blend layers differ in size.
    #[error("Blend layers must match in size: front {front:?}, back {back:?}")]
    LayerSizeMismatch { front: (u32, u32), back: (u32, u32) },

    /// An image carries alpha values other than 0 and 255.
    #[error("Image {index} has non-binary alpha; only 0 and 255 are allowed")]
    NonBinaryAlpha { index: usize },

    #[error(transparent)]
    Padding(#[from] PaddingError),
}

/// Errors raised by an image source while fetching or decoding an input.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent or its body could not be read.
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("Request to {url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    /// The payload is not a decodable image.
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Errors raised by the end-to-end cutout and collage pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Background removal failed for the input at `index`.
    #[error("Background removal failed for input {index}: {source}")]
    RemoveBackground {
        index: usize,
        #[source]
        source: RemoveBackgroundError,
    },

    #[error(transparent)]
    Collage(#[from] CollageError),

    /// Every request was empty, so there is nothing to composite.
    #[error("No input images were provided")]
    NoSources,
}
