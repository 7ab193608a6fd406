//! Design attributes, user selections, catalogs and resolved combinations.
//!
//! These types are serialized to and from JSON (selections from clients,
//! combinations to the prompt layer and metadata) and TOML (the catalog in
//! `config.toml`). Field names match the generator's response schema.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five design attributes. Declaration order is signature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    ColorPalette,
    Pattern,
    Motif,
    Style,
    Finish,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::ColorPalette,
        Attribute::Pattern,
        Attribute::Motif,
        Attribute::Style,
        Attribute::Finish,
    ];

    /// JSON/TOML key.
    pub fn key(self) -> &'static str {
        match self {
            Attribute::ColorPalette => "color_palette",
            Attribute::Pattern => "pattern",
            Attribute::Motif => "motif",
            Attribute::Style => "style",
            Attribute::Finish => "finish",
        }
    }

    /// Human-readable label for CLI output.
    pub fn label(self) -> &'static str {
        match self {
            Attribute::ColorPalette => "Color palette",
            Attribute::Pattern => "Pattern",
            Attribute::Motif => "Motif",
            Attribute::Style => "Style",
            Attribute::Finish => "Finish",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A user's choice for one attribute.
///
/// Parsed from a plain string: `"default"` in any case, surrounding
/// whitespace ignored, means the system chooses. Anything else is locked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    Default,
    Locked(String),
}

impl Selection {
    pub fn is_default(&self) -> bool {
        matches!(self, Selection::Default)
    }

    pub fn locked(&self) -> Option<&str> {
        match self {
            Selection::Locked(v) => Some(v),
            Selection::Default => None,
        }
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("default") {
            Selection::Default
        } else {
            Selection::Locked(value)
        }
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Selection::from(value.to_string())
    }
}

impl From<Selection> for String {
    fn from(value: Selection) -> Self {
        match value {
            Selection::Default => "Default".to_string(),
            Selection::Locked(v) => v,
        }
    }
}

/// The user's selections for one generation request. Missing keys are `Default`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Selections {
    pub color_palette: Selection,
    pub pattern: Selection,
    pub motif: Selection,
    pub style: Selection,
    pub finish: Selection,
}

impl Selections {
    pub fn get(&self, attr: Attribute) -> &Selection {
        match attr {
            Attribute::ColorPalette => &self.color_palette,
            Attribute::Pattern => &self.pattern,
            Attribute::Motif => &self.motif,
            Attribute::Style => &self.style,
            Attribute::Finish => &self.finish,
        }
    }

    pub fn set(&mut self, attr: Attribute, selection: impl Into<Selection>) {
        let slot = match attr {
            Attribute::ColorPalette => &mut self.color_palette,
            Attribute::Pattern => &mut self.pattern,
            Attribute::Motif => &mut self.motif,
            Attribute::Style => &mut self.style,
            Attribute::Finish => &mut self.finish,
        };
        *slot = selection.into();
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, attr: Attribute, selection: impl Into<Selection>) -> Self {
        self.set(attr, selection);
        self
    }

    /// Whether any attribute is left for the system to choose.
    pub fn any_default(&self) -> bool {
        Attribute::ALL.iter().any(|&a| self.get(a).is_default())
    }

    /// Attributes the system has to choose, in signature order.
    pub fn defaulted(&self) -> impl Iterator<Item = Attribute> + '_ {
        Attribute::ALL.into_iter().filter(|&a| self.get(a).is_default())
    }

    /// Locked attributes with their values, in signature order.
    pub fn locked(&self) -> impl Iterator<Item = (Attribute, &str)> + '_ {
        Attribute::ALL
            .into_iter()
            .filter_map(|a| self.get(a).locked().map(|v| (a, v)))
    }
}

/// Legal values per attribute, in preference order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Catalog {
    pub color_palette: Vec<String>,
    pub pattern: Vec<String>,
    pub motif: Vec<String>,
    pub style: Vec<String>,
    pub finish: Vec<String>,
}

impl Catalog {
    pub fn values(&self, attr: Attribute) -> &[String] {
        match attr {
            Attribute::ColorPalette => &self.color_palette,
            Attribute::Pattern => &self.pattern,
            Attribute::Motif => &self.motif,
            Attribute::Style => &self.style,
            Attribute::Finish => &self.finish,
        }
    }

    pub fn contains(&self, attr: Attribute, value: &str) -> bool {
        self.values(attr).iter().any(|v| v == value)
    }

    /// The stock napkin catalog.
    pub fn napkin() -> Self {
        fn owned(values: &[&str]) -> Vec<String> {
            values.iter().map(|v| v.to_string()).collect()
        }
        Self {
            color_palette: owned(&[
                "pastel pinks",
                "jewel tones",
                "metallic gold & black",
                "earthy autumn shades",
            ]),
            pattern: owned(&[
                "stripes",
                "chevrons",
                "damask",
                "watercolor wash",
                "geometric lattice",
            ]),
            motif: owned(&["pumpkins", "bats", "florals", "stars", "waves", "shells"]),
            style: owned(&[
                "whimsical gothic",
                "festive holiday sparkle",
                "coastal summer",
                "rustic harvest",
            ]),
            finish: owned(&["matte", "foil stamping", "embossed texture", "glossy lacquer"]),
        }
    }
}

/// Ordered five-tuple identifying a combination.
pub type Signature = [String; 5];

/// One fully resolved design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    pub color_palette: String,
    pub pattern: String,
    pub motif: String,
    pub style: String,
    pub finish: String,
    #[serde(default)]
    pub rationale: String,
}

impl Combination {
    /// Build a combination from a per-attribute value function.
    pub fn from_fn(
        rationale: impl Into<String>,
        mut value: impl FnMut(Attribute) -> String,
    ) -> Self {
        Self {
            color_palette: value(Attribute::ColorPalette),
            pattern: value(Attribute::Pattern),
            motif: value(Attribute::Motif),
            style: value(Attribute::Style),
            finish: value(Attribute::Finish),
            rationale: rationale.into(),
        }
    }

    pub fn get(&self, attr: Attribute) -> &str {
        match attr {
            Attribute::ColorPalette => &self.color_palette,
            Attribute::Pattern => &self.pattern,
            Attribute::Motif => &self.motif,
            Attribute::Style => &self.style,
            Attribute::Finish => &self.finish,
        }
    }

    pub fn signature(&self) -> Signature {
        Attribute::ALL.map(|a| self.get(a).to_string())
    }
}
