//! High-level enhancement operations.
//!
//! [`enhance`] runs the five stages for one strength. [`apply_post_processing`]
//! produces the full low/medium/high set from a single source image.

use super::EnhanceError;
use super::params::Strength;
use super::stages;
use image::{DynamicImage, RgbImage};

/// Result type for enhancement operations.
pub type Result<T> = std::result::Result<T, EnhanceError>;

/// The three graduated variants of one source image.
#[derive(Debug, Clone)]
pub struct EnhancedSet {
    pub low: RgbImage,
    pub medium: RgbImage,
    pub high: RgbImage,
}

impl EnhancedSet {
    pub fn get(&self, strength: Strength) -> &RgbImage {
        match strength {
            Strength::Low => &self.low,
            Strength::Medium => &self.medium,
            Strength::High => &self.high,
        }
    }

    /// Variants paired with their strength, in low → high order.
    pub fn iter(&self) -> impl Iterator<Item = (Strength, &RgbImage)> {
        Strength::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

/// Enhance one image at the given strength.
///
/// Alpha is dropped; the output is RGB8 with the input's dimensions.
pub fn enhance(image: &DynamicImage, strength: Strength) -> Result<RgbImage> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(EnhanceError::Processing(format!(
            "image has no pixels ({width}x{height})"
        )));
    }

    let params = strength.params();
    let rgb = image.to_rgb8();

    let rgb = stages::white_point_neutral(&rgb, params.white_point_percentile);
    tracing::debug!(%strength, stage = "white_point", "stage complete");

    let rgb = stages::local_contrast(&rgb, params.clahe_clip);
    tracing::debug!(%strength, stage = "local_contrast", "stage complete");

    let rgb = stages::vibrance(&rgb, params.vibrance);
    tracing::debug!(%strength, stage = "vibrance", "stage complete");

    let sharpened = stages::unsharp(&rgb, params.unsharp_amount, params.unsharp_sigma);
    tracing::debug!(%strength, stage = "unsharp", "stage complete");

    Ok(stages::quantize(&sharpened))
}

/// Produce the low, medium and high variants of `image`.
///
/// Each pass starts from `image` itself; passes never feed each other. They
/// run in parallel on the rayon pool. If any pass fails, no variant is
/// returned.
pub fn apply_post_processing(image: &DynamicImage) -> Result<EnhancedSet> {
    tracing::info!(
        width = image.width(),
        height = image.height(),
        "applying post-processing"
    );

    let (low, (medium, high)) = rayon::join(
        || enhance(image, Strength::Low),
        || {
            rayon::join(
                || enhance(image, Strength::Medium),
                || enhance(image, Strength::High),
            )
        },
    );

    match (low, medium, high) {
        (Ok(low), Ok(medium), Ok(high)) => Ok(EnhancedSet { low, medium, high }),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
            tracing::error!(error = %e, "post-processing failed");
            Err(e)
        }
    }
}
