//! Strength presets for the enhancement pipeline.
//!
//! These types describe *how hard* to enhance, not *how* to do it. The stage
//! functions in [`stages`](super::stages) take plain numbers; this module owns
//! the fixed mapping from a [`Strength`] tag to those numbers.
//!
//! ## Preset table
//!
//! | strength | clahe_clip | vibrance | unsharp_amount | unsharp_sigma | white_point_percentile |
//! |---|---|---|---|---|---|
//! | low | 1.4 | 0.12 | 0.25 | 0.9 | 99.0 |
//! | medium | 1.6 | 0.18 | 0.35 | 1.0 | 99.2 |
//! | high | 1.9 | 0.25 | 0.45 | 1.1 | 99.4 |
//!
//! The table is tuned for watercolor and foil artwork and is not configurable.

use super::EnhanceError;
use std::fmt;
use std::str::FromStr;

/// Enhancement strength tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strength {
    Low,
    Medium,
    High,
}

impl Strength {
    /// All strengths in the order the composite call produces them.
    pub const ALL: [Strength; 3] = [Strength::Low, Strength::Medium, Strength::High];

    /// Lowercase tag, as accepted by [`FromStr`] and used in output filenames.
    pub fn as_str(self) -> &'static str {
        match self {
            Strength::Low => "low",
            Strength::Medium => "medium",
            Strength::High => "high",
        }
    }

    pub fn params(self) -> StrengthParams {
        match self {
            Strength::Low => StrengthParams {
                clahe_clip: 1.4,
                vibrance: 0.12,
                unsharp_amount: 0.25,
                unsharp_sigma: 0.9,
                white_point_percentile: 99.0,
            },
            Strength::Medium => StrengthParams {
                clahe_clip: 1.6,
                vibrance: 0.18,
                unsharp_amount: 0.35,
                unsharp_sigma: 1.0,
                white_point_percentile: 99.2,
            },
            Strength::High => StrengthParams {
                clahe_clip: 1.9,
                vibrance: 0.25,
                unsharp_amount: 0.45,
                unsharp_sigma: 1.1,
                white_point_percentile: 99.4,
            },
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strength {
    type Err = EnhanceError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Strength::Low),
            "medium" => Ok(Strength::Medium),
            "high" => Ok(Strength::High),
            other => Err(EnhanceError::InvalidArgument(format!(
                "unknown strength '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

/// Numeric parameters for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrengthParams {
    /// CLAHE clip limit (relative to a uniform histogram).
    pub clahe_clip: f32,
    /// Vibrance amount; saturation gains `vibrance * (1 - s)`.
    pub vibrance: f32,
    /// Unsharp mask weight.
    pub unsharp_amount: f32,
    /// Gaussian sigma of the unsharp blur, in pixels.
    pub unsharp_sigma: f32,
    /// Luminance percentile mapped to full white.
    pub white_point_percentile: f32,
}
