//! Application configuration.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the config directory (`--config-dir`, default `.`) and is a sparse overlay
//! on top of the stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! product_type = "premium napkin"   # Named in every generator prompt
//!
//! [catalog]                         # Legal values per design attribute
//! color_palette = ["pastel pinks", "jewel tones", "metallic gold & black", "earthy autumn shades"]
//! pattern = ["stripes", "chevrons", "damask", "watercolor wash", "geometric lattice"]
//! motif = ["pumpkins", "bats", "florals", "stars", "waves", "shells"]
//! style = ["whimsical gothic", "festive holiday sparkle", "coastal summer", "rustic harvest"]
//! finish = ["matte", "foil stamping", "embossed texture", "glossy lacquer"]
//!
//! [processing]
//! max_processes = 4                 # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Override just the values you want. A catalog list given in the file
//! replaces the stock list for that attribute; the other lists are kept.
//!
//! ```toml
//! [catalog]
//! motif = ["lemons", "olives"]
//! ```
//!
//! Unknown keys are rejected to catch typos early. The enhancement strength
//! table is fixed and not configurable.

use crate::combine::{Attribute, Catalog};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Product named in generator prompts.
    pub product_type: String,
    /// Legal values per design attribute.
    pub catalog: Catalog,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            product_type: "premium napkin".to_string(),
            catalog: Catalog::napkin(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reject values the engines cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.product_type.trim().is_empty() {
            return Err(ConfigError::Validation(
                "product_type must not be empty".into(),
            ));
        }
        for attr in Attribute::ALL {
            let values = self.catalog.values(attr);
            if values.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "catalog.{attr} must not be empty"
                )));
            }
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "catalog.{attr} contains an empty value"
                )));
            }
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel enhancement workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

fn available_cores() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// Worker count for the enhancement pool: the configured cap, never more
/// than the machine has cores.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = available_cores();
    config.max_processes.map_or(cores, |cap| cap.min(cores))
}

// =============================================================================
// Loading: stock defaults, then the user's overlay
// =============================================================================

/// [`AppConfig::default`] as a TOML table, the bottom layer of every load.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Lay `overlay` over `base`.
///
/// Tables merge per key, recursively. Anything else in the overlay wins
/// outright, so a catalog list in the user file replaces the stock list
/// instead of being appended to it.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut merged), toml::Value::Table(overrides)) => {
            for (key, value) in overrides {
                let value = match merged.remove(&key) {
                    Some(stock) => merge_toml(stock, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            toml::Value::Table(merged)
        }
        (_, replacement) => replacement,
    }
}

/// Parse `dir/config.toml` without interpreting it; `None` when absent.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = dir.join("config.toml");
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path)?;
    Ok(Some(toml::from_str(&text)?))
}

/// Apply the overlay, if any, and produce a validated [`AppConfig`].
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let layered = overlay.into_iter().fold(base, merge_toml);
    let config: AppConfig = layered.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Stock defaults overlaid with `dir/config.toml` when it exists.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let overlay = load_raw_config(dir)?;
    if overlay.is_some() {
        tracing::debug!(dir = %dir.display(), "loaded config.toml");
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Napkin Atelier Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# Product named in every prompt sent to the text generator.
product_type = "premium napkin"

# ---------------------------------------------------------------------------
# Design catalog
# ---------------------------------------------------------------------------
# Legal values per attribute, in preference order. The deterministic
# fallback rotates through each list from the top, so put the safest
# choices first. A list given here replaces the stock list.
[catalog]
color_palette = ["pastel pinks", "jewel tones", "metallic gold & black", "earthy autumn shades"]
pattern = ["stripes", "chevrons", "damask", "watercolor wash", "geometric lattice"]
motif = ["pumpkins", "bats", "florals", "stars", "waves", "shells"]
style = ["whimsical gothic", "festive holiday sparkle", "coastal summer", "rustic harvest"]
finish = ["matte", "foil stamping", "embossed texture", "glossy lacquer"]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel enhancement workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_uses_napkin_catalog() {
        let config = AppConfig::default();
        assert_eq!(config.product_type, "premium napkin");
        assert_eq!(config.catalog, Catalog::napkin());
        assert_eq!(config.processing.max_processes, None);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.product_type, "premium napkin");
        assert_eq!(config.catalog.finish[0], "matte");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
product_type = "cocktail napkin"

[catalog]
motif = ["lemons", "olives"]
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.product_type, "cocktail napkin");
        assert_eq!(config.catalog.motif, vec!["lemons", "olives"]);
        // Unspecified lists keep the stock values
        assert_eq!(config.catalog.pattern, Catalog::napkin().pattern);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "product_type = ").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[catalog]
style = []
"#,
        )
        .unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(m)) if m.contains("catalog.style")));
    }

    // =========================================================================
    // processing tests
    // =========================================================================

    #[test]
    fn effective_threads_caps_at_core_count() {
        let cores = available_cores();
        let with_cap = |cap| effective_threads(&ProcessingConfig { max_processes: cap });
        assert_eq!(with_cap(None), cores);
        assert_eq!(with_cap(Some(99999)), cores);
        assert_eq!(with_cap(Some(1)), 1);
    }

    #[test]
    fn parse_processing_config() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[processing]\nmax_processes = 4\n").unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(config.processing.max_processes, Some(4));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"product_type = "napkin""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"product_type = "placemat""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("product_type").unwrap().as_str(), Some("placemat"));
    }

    #[test]
    fn merge_toml_array_replaces_whole_list() {
        let base: toml::Value = toml::from_str(
            r#"
[catalog]
motif = ["stars", "waves", "shells"]
finish = ["matte"]
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[catalog]
motif = ["lemons"]
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let catalog = merged.get("catalog").unwrap();
        assert_eq!(catalog.get("motif").unwrap().as_array().unwrap().len(), 1);
        // finish preserved from base
        assert_eq!(catalog.get("finish").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("a = 10").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(10));
        assert_eq!(merged.get("b").unwrap().as_integer(), Some(2));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("prodct_type = \"napkin\"");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unknown field"));
    }

    #[test]
    fn unknown_catalog_attribute_rejected() {
        let toml_str = r#"
[catalog]
texture = ["linen"]
"#;
        let result: Result<AppConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[processing]\nmax_proceses = 2\n",
        )
        .unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    // =========================================================================
    // validate tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_empty_product_type() {
        let config = AppConfig {
            product_type: "  ".into(),
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_blank_catalog_value() {
        let mut config = AppConfig::default();
        config.catalog.pattern.push(String::new());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_zero_processes() {
        let config = AppConfig {
            processing: ProcessingConfig {
                max_processes: Some(0),
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_raw_config_returns_none_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert!(load_raw_config(tmp.path()).unwrap().is_none());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: AppConfig = toml::from_str(stock_config_toml()).unwrap();
        let stock = AppConfig::default();
        assert_eq!(config.product_type, stock.product_type);
        assert_eq!(config.catalog, stock.catalog);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        assert!(val.get("product_type").is_some());
        assert!(val.get("catalog").is_some());
        assert!(val.get("processing").is_some());
    }
}
