//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Enhance
//!
//! ```text
//! napkin.png (1024x1024)
//!     low: out/napkin-low.png
//!     medium: out/napkin-medium.png
//!     high: out/napkin-high.png
//! ```
//!
//! ## Combine
//!
//! ```text
//! 001 pastel pinks / stripes / stars / coastal summer / matte
//!     Rationale: Soft palette keeps the stripes calm...
//! 002 ...
//!
//! Resolved 3 combinations (2 locked, 3 chosen)
//! ```
//!
//! ## Catalog
//!
//! ```text
//! Color palette (4)
//!     001 pastel pinks
//!     002 jewel tones
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::combine::{Attribute, Catalog, Combination, Selections};
use crate::enhance::Strength;
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

// ============================================================================
// Enhance
// ============================================================================

/// Format the result of `enhance`: source header plus one line per written variant.
pub fn format_enhance_output(
    source: &Path,
    dimensions: (u32, u32),
    written: &[(Strength, PathBuf)],
) -> Vec<String> {
    let name = source
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string());
    let mut lines = vec![format!("{} ({}x{})", name, dimensions.0, dimensions.1)];
    for (strength, path) in written {
        lines.push(format!("{}{}: {}", indent(1), strength, path.display()));
    }
    lines
}

/// Print enhance output to stdout.
pub fn print_enhance_output(
    source: &Path,
    dimensions: (u32, u32),
    written: &[(Strength, PathBuf)],
) {
    for line in format_enhance_output(source, dimensions, written) {
        println!("{}", line);
    }
}

// ============================================================================
// Combine
// ============================================================================

/// One-line identity of a combination: the five values in attribute order.
fn combination_line(combination: &Combination) -> String {
    Attribute::ALL
        .iter()
        .map(|&a| combination.get(a))
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Format resolved combinations with their rationale and a summary line.
pub fn format_combinations(combinations: &[Combination], selections: &Selections) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, combo) in combinations.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), combination_line(combo)));
        if !combo.rationale.is_empty() {
            lines.push(format!(
                "{}Rationale: {}",
                indent(1),
                truncate(&combo.rationale, 80)
            ));
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "Resolved {} ({} locked, {} chosen)",
        plural(combinations.len(), "combination"),
        selections.locked().count(),
        selections.defaulted().count()
    ));
    lines
}

/// Print combinations to stdout.
pub fn print_combinations(combinations: &[Combination], selections: &Selections) {
    for line in format_combinations(combinations, selections) {
        println!("{}", line);
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Format the catalog: one header per attribute, values indexed beneath.
pub fn format_catalog(catalog: &Catalog) -> Vec<String> {
    let mut lines = Vec::new();
    for attr in Attribute::ALL {
        let values = catalog.values(attr);
        lines.push(format!("{} ({})", attr.label(), values.len()));
        for (i, value) in values.iter().enumerate() {
            lines.push(format!("{}{} {}", indent(1), format_index(i + 1), value));
        }
    }
    lines
}

/// Print the catalog to stdout.
pub fn print_catalog(catalog: &Catalog) {
    for line in format_catalog(catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
