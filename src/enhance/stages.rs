//! The five pipeline stages.
//!
//! Every stage takes the previous stage's buffer by reference and returns a
//! new one. None of them fail: dimension checks happen once, up front, in
//! [`enhance`](super::pipeline::enhance).

use super::clahe;
use super::color::{Hsv8, Lab8, hsv8_to_rgb, lab8_to_rgb, rgb_to_hsv8, rgb_to_lab8};
use image::{ImageBuffer, Rgb, Rgb32FImage, RgbImage};

/// Rec. 709 luma weights.
pub const LUMA_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Brightness the white-point percentile is mapped to.
pub const WHITE_TARGET: f32 = 255.0;

/// 8-bit L above which a pixel counts as a protected highlight.
pub const HIGHLIGHT_THRESHOLD: u8 = 235;

/// Normalized saturation below which a bright pixel counts as background.
pub const BACKGROUND_MAX_SATURATION: f32 = 0.12;

/// Normalized value above which a desaturated pixel counts as background.
pub const BACKGROUND_MIN_VALUE: f32 = 0.90;

/// Nearest 8-bit value; used only by the final clamp.
#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Clamp then drop the fraction, as intermediate 8-bit stages do.
#[inline]
fn trunc_u8(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

// =============================================================================
// Stage 1: neutral white point
// =============================================================================

/// Percentile with linear interpolation between the two closest ranks.
///
/// Sorts `values` in place. Returns 0 for an empty slice.
pub fn percentile(values: &mut [f32], pct: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable_by(f32::total_cmp);
    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (values.len() - 1) as f32;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    values[lo] + (values[hi] - values[lo]) * (rank - lo as f32)
}

/// Stretch brightness so the `pct` luminance percentile lands on full white.
///
/// One gain for all three channels, so grays stay gray.
pub fn white_point_neutral(img: &RgbImage, pct: f32) -> RgbImage {
    let mut luma: Vec<f32> = img
        .pixels()
        .map(|p| {
            LUMA_WEIGHTS[0] * p[0] as f32
                + LUMA_WEIGHTS[1] * p[1] as f32
                + LUMA_WEIGHTS[2] * p[2] as f32
        })
        .collect();
    let gain = WHITE_TARGET / percentile(&mut luma, pct).max(1.0);

    let mut out = img.clone();
    for p in out.pixels_mut() {
        p.0 = p.0.map(|c| trunc_u8(c as f32 * gain));
    }
    out
}

// =============================================================================
// Stage 2: local contrast with highlight protection
// =============================================================================

/// Equalize an 8-bit lightness plane, leaving highlights (`L > 235`) untouched.
pub fn equalize_lightness(l: &[u8], width: u32, height: u32, clip_limit: f32) -> Vec<u8> {
    let equalized = clahe::equalize(l, width, height, clip_limit, clahe::DEFAULT_GRID);
    l.iter()
        .zip(equalized)
        .map(|(&orig, eq)| if orig > HIGHLIGHT_THRESHOLD { orig } else { eq })
        .collect()
}

/// CLAHE on lightness only; chrominance is carried through unchanged.
pub fn local_contrast(img: &RgbImage, clip_limit: f32) -> RgbImage {
    let (width, height) = img.dimensions();
    let lab: Vec<Lab8> = img.pixels().map(|p| rgb_to_lab8(p.0)).collect();
    let lightness: Vec<u8> = lab.iter().map(|p| p.l).collect();
    let equalized = equalize_lightness(&lightness, width, height, clip_limit);

    let mut out = img.clone();
    for ((p, lab), l) in out.pixels_mut().zip(lab).zip(equalized) {
        // Unchanged lightness passes the pixel through without a Lab round trip
        if l != lab.l {
            p.0 = lab8_to_rgb(Lab8 { l, ..lab });
        }
    }
    out
}

// =============================================================================
// Stage 3: background-protected vibrance
// =============================================================================

/// Near-white, near-neutral pixels that should never pick up a tint.
pub fn is_background(hsv: Hsv8) -> bool {
    let s = hsv.s as f32 / 255.0;
    let v = hsv.v as f32 / 255.0;
    s < BACKGROUND_MAX_SATURATION && v > BACKGROUND_MIN_VALUE
}

/// New saturation for one pixel: low saturation gains most, full saturation
/// gains nothing, background keeps its saturation exactly.
pub fn vibrance_saturation(hsv: Hsv8, amount: f32) -> u8 {
    if is_background(hsv) {
        return hsv.s;
    }
    let s = hsv.s as f32 / 255.0;
    trunc_u8((s + amount * (1.0 - s)) * 255.0)
}

pub fn vibrance(img: &RgbImage, amount: f32) -> RgbImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        let hsv = rgb_to_hsv8(p.0);
        let s = vibrance_saturation(hsv, amount);
        if s != hsv.s {
            p.0 = hsv8_to_rgb(Hsv8 { s, ..hsv });
        }
    }
    out
}

// =============================================================================
// Stage 4: unsharp mask
// =============================================================================

/// `src * (1 + amount) - blur * amount`, left unclamped for [`quantize`].
pub fn unsharp(img: &RgbImage, amount: f32, sigma: f32) -> Rgb32FImage {
    let blurred = image::imageops::blur(img, sigma);
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let src = img.get_pixel(x, y).0;
        let blur = blurred.get_pixel(x, y).0;
        Rgb([0, 1, 2].map(|c| src[c] as f32 * (1.0 + amount) - blur[c] as f32 * amount))
    })
}

// =============================================================================
// Stage 5: final clamp
// =============================================================================

pub fn quantize(img: &Rgb32FImage) -> RgbImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        Rgb(img.get_pixel(x, y).0.map(to_u8))
    })
}
