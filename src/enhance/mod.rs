//! Image post-processing: one source image in, three enhanced variants out.
//!
//! | Stage | Function | Working space |
//! |---|---|---|
//! | 1. Neutral white point | [`stages::white_point_neutral`] | RGB, one luminance gain |
//! | 2. Local contrast | [`stages::local_contrast`] | 8-bit L\*a\*b\*, CLAHE on L, highlights protected |
//! | 3. Vibrance | [`stages::vibrance`] | HSV, near-white background protected |
//! | 4. Unsharp mask | [`stages::unsharp`] | RGB, `f32` |
//! | 5. Final clamp | [`stages::quantize`] | RGB8 |
//!
//! The module is split into:
//! - **Parameters**: [`Strength`] tags and their fixed [`StrengthParams`]
//! - **Color**: pure per-pixel Lab/HSV conversions
//! - **CLAHE**: tiled histogram equalization of a single plane
//! - **Stages**: the five image-to-image transforms
//! - **Pipeline**: [`enhance`] and [`apply_post_processing`]

mod clahe;
pub mod color;
pub mod params;
pub mod pipeline;
pub mod stages;

pub use params::{Strength, StrengthParams};
pub use pipeline::{EnhancedSet, apply_post_processing, enhance};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnhanceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Processing failed: {0}")]
    Processing(String),
}

/// Decode an encoded image (PNG, JPEG, TIFF, WebP) from memory.
pub fn decode(bytes: &[u8]) -> Result<image::DynamicImage, EnhanceError> {
    image::load_from_memory(bytes)
        .map_err(|e| EnhanceError::InvalidArgument(format!("Failed to decode image: {e}")))
}

/// Load and decode an image from disk.
pub fn load(path: &std::path::Path) -> Result<image::DynamicImage, EnhanceError> {
    let invalid = |action: &str, e: &dyn std::fmt::Display| {
        EnhanceError::InvalidArgument(format!("Failed to {action} {}: {e}", path.display()))
    };
    image::ImageReader::open(path)
        .map_err(|e| invalid("open", &e))?
        .with_guessed_format()
        .map_err(|e| invalid("read", &e))?
        .decode()
        .map_err(|e| invalid("decode", &e))
}
