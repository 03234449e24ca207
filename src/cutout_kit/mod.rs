pub mod collage;
pub mod color_key;
pub mod contour;
pub mod morphology;
pub mod padding;
pub mod pipeline;
pub mod remove_background;
pub mod source;
