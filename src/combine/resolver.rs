//! Combination resolution.
//!
//! [`Combiner::resolve`] asks the injected generator once, validates the
//! answer, removes duplicates and tops the set back up to three. When the
//! generator fails or its answer does not validate, a deterministic local
//! rotation over the catalog is used instead.

use super::generator::{GeneratorError, TextGenerator};
use super::prompt::{build_combination_prompt, build_rationale_prompt};
use super::types::{Attribute, Catalog, Combination, Selections, Signature};
use super::validate::{EXPECTED_COMBINATIONS, parse_response};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use thiserror::Error;

pub const TOP_UP_RATIONALE: &str = "Auto-diversified fallback.";
pub const FALLBACK_RATIONALE: &str = "Local fallback: balanced rotation across defaults.";

#[derive(Error, Debug)]
pub enum CombineError {
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for resolution.
pub type Result<T> = std::result::Result<T, CombineError>;

/// Resolves user selections into three design combinations.
///
/// Holds no state between calls beyond the generator and product type, so a
/// `Combiner` over a `Sync` generator can be shared across threads.
#[derive(Debug, Clone)]
pub struct Combiner<G> {
    generator: G,
    product_type: String,
}

impl<G: TextGenerator> Combiner<G> {
    pub fn new(generator: G, product_type: impl Into<String>) -> Self {
        Self {
            generator,
            product_type: product_type.into(),
        }
    }

    pub fn product_type(&self) -> &str {
        &self.product_type
    }

    /// Resolve with the thread-local RNG driving the top-up.
    pub fn resolve(
        &self,
        selections: &Selections,
        catalog: &Catalog,
    ) -> Result<Vec<Combination>> {
        self.resolve_with_rng(selections, catalog, &mut rand::thread_rng())
    }

    /// Resolve with an explicit RNG.
    ///
    /// The RNG is consulted only when the generated set had duplicates and
    /// needs topping up. The fallback path never touches it.
    pub fn resolve_with_rng<R: Rng + ?Sized>(
        &self,
        selections: &Selections,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<Vec<Combination>> {
        check_catalog(selections, catalog)?;

        let prompt = build_combination_prompt(&self.product_type, selections, catalog);
        let generated = self
            .generator
            .generate(&prompt)
            .map_err(|e| e.to_string())
            .and_then(|raw| parse_response(&raw, selections, catalog).map_err(|e| e.to_string()));

        let combinations = match generated {
            Ok(parsed) => {
                let mut unique = dedupe(parsed);
                if unique.len() < EXPECTED_COMBINATIONS {
                    tracing::debug!(unique = unique.len(), "topping up duplicate combinations");
                    top_up_random(&mut unique, selections, catalog, rng);
                }
                unique
            }
            Err(reason) => {
                tracing::warn!(%reason, "generated combinations unusable, using local fallback");
                fallback(selections, catalog)
            }
        };

        tracing::info!(
            count = combinations.len(),
            defaulted = selections.defaulted().count(),
            "resolved combinations"
        );
        Ok(combinations)
    }

    /// Ask the generator for a short rationale of one combination.
    pub fn explain(
        &self,
        combination: &Combination,
    ) -> std::result::Result<String, GeneratorError> {
        let prompt = build_rationale_prompt(&self.product_type, combination);
        let text = self.generator.generate(&prompt)?;
        Ok(text.trim().to_string())
    }
}

/// Every defaulted attribute needs at least one catalog value.
fn check_catalog(selections: &Selections, catalog: &Catalog) -> Result<()> {
    let empty: Vec<&str> = selections
        .defaulted()
        .filter(|&a| catalog.values(a).is_empty())
        .map(Attribute::key)
        .collect();
    if empty.is_empty() {
        Ok(())
    } else {
        Err(CombineError::Configuration(format!(
            "no catalog values for defaulted attribute(s): {}",
            empty.join(", ")
        )))
    }
}

/// Drop combinations whose signature was already seen, keeping order.
pub fn dedupe(combinations: Vec<Combination>) -> Vec<Combination> {
    let mut seen = HashSet::new();
    combinations
        .into_iter()
        .filter(|c| seen.insert(c.signature()))
        .collect()
}

/// Catalog values of `attr` with repeats removed, in catalog order.
fn distinct_values(catalog: &Catalog, attr: Attribute) -> Vec<&str> {
    let mut seen = HashSet::new();
    catalog
        .values(attr)
        .iter()
        .map(String::as_str)
        .filter(|v| seen.insert(*v))
        .collect()
}

/// Number of distinct combinations reachable by varying the defaulted attributes.
pub fn reachable_space(selections: &Selections, catalog: &Catalog) -> usize {
    selections
        .defaulted()
        .map(|a| distinct_values(catalog, a).len())
        .fold(1usize, usize::saturating_mul)
}

/// Fill `combinations` up to three with random unseen combinations.
///
/// Locked attributes stay fixed. Stops early when every reachable
/// combination is already present.
fn top_up_random<R: Rng + ?Sized>(
    combinations: &mut Vec<Combination>,
    selections: &Selections,
    catalog: &Catalog,
    rng: &mut R,
) {
    let space = reachable_space(selections, catalog);
    let mut seen: HashSet<Signature> = combinations.iter().map(Combination::signature).collect();

    while combinations.len() < EXPECTED_COMBINATIONS && seen.len() < space {
        let candidate = Combination::from_fn(TOP_UP_RATIONALE, |attr| {
            match selections.get(attr).locked() {
                Some(locked) => locked.to_string(),
                None => catalog
                    .values(attr)
                    .choose(rng)
                    .cloned()
                    .unwrap_or_default(),
            }
        });
        if seen.insert(candidate.signature()) {
            combinations.push(candidate);
        }
    }
}

/// Deterministic local combinations.
///
/// Slot `i` takes the `i`-th catalog value (wrapping) of each defaulted
/// attribute. If rotation produced duplicates, the remaining slots are filled
/// by enumerating defaulted values in catalog order, so fewer than three come
/// back only when fewer than three distinct combinations exist.
pub fn fallback(selections: &Selections, catalog: &Catalog) -> Vec<Combination> {
    let rotated = (0..EXPECTED_COMBINATIONS)
        .map(|slot| {
            Combination::from_fn(FALLBACK_RATIONALE, |attr| {
                match selections.get(attr).locked() {
                    Some(locked) => locked.to_string(),
                    None => {
                        let values = catalog.values(attr);
                        values
                            .get(slot % values.len().max(1))
                            .cloned()
                            .unwrap_or_default()
                    }
                }
            })
        })
        .collect();
    let mut combinations = dedupe(rotated);
    if combinations.len() < EXPECTED_COMBINATIONS {
        top_up_enumerated(&mut combinations, selections, catalog);
    }
    combinations
}

/// Odometer walk over the defaulted attributes' distinct values, last
/// attribute fastest, accepting unseen signatures until three are present.
fn top_up_enumerated(
    combinations: &mut Vec<Combination>,
    selections: &Selections,
    catalog: &Catalog,
) {
    let defaulted: Vec<(Attribute, Vec<&str>)> = selections
        .defaulted()
        .map(|a| (a, distinct_values(catalog, a)))
        .collect();
    if defaulted.iter().any(|(_, values)| values.is_empty()) {
        return;
    }

    let mut seen: HashSet<Signature> = combinations.iter().map(Combination::signature).collect();
    let mut digits = vec![0usize; defaulted.len()];

    while combinations.len() < EXPECTED_COMBINATIONS {
        let candidate = Combination::from_fn(FALLBACK_RATIONALE, |attr| {
            match defaulted.iter().position(|(a, _)| *a == attr) {
                Some(i) => defaulted[i].1[digits[i]].to_string(),
                None => selections.get(attr).locked().unwrap_or_default().to_string(),
            }
        });
        if seen.insert(candidate.signature()) {
            combinations.push(candidate);
        }

        // Advance; a full carry out of the first digit means the space is exhausted.
        let mut i = digits.len();
        loop {
            if i == 0 {
                return;
            }
            i -= 1;
            digits[i] += 1;
            if digits[i] < defaulted[i].1.len() {
                break;
            }
            digits[i] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::generator::tests::MockGenerator;
    use crate::combine::generator::Offline;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog {
            color_palette: vec!["pastel".into(), "neon".into(), "earthy".into()],
            pattern: vec!["stripes".into(), "dots".into()],
            motif: vec!["stars".into(), "moons".into(), "shells".into()],
            style: vec!["modern".into(), "vintage".into()],
            finish: vec!["matte".into(), "glossy".into()],
        }
    }

    fn locked_stripes_matte() -> Selections {
        Selections::default()
            .with(Attribute::Pattern, "stripes")
            .with(Attribute::Finish, "matte")
    }

    fn record(palette: &str, motif: &str, style: &str) -> serde_json::Value {
        json!({
            "color_palette": palette,
            "pattern": "stripes",
            "motif": motif,
            "style": style,
            "finish": "matte",
            "rationale": "cohesive",
        })
    }

    fn response(items: Vec<serde_json::Value>) -> String {
        json!({ "combinations": items }).to_string()
    }

    fn assert_unique(combos: &[Combination]) {
        let sigs: HashSet<Signature> = combos.iter().map(Combination::signature).collect();
        assert_eq!(sigs.len(), combos.len(), "duplicate signatures in {combos:?}");
    }

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    // =========================================================================
    // Generated path
    // =========================================================================

    #[test]
    fn valid_response_is_returned_unchanged() {
        let raw = response(vec![
            record("pastel", "stars", "modern"),
            record("neon", "moons", "vintage"),
            record("earthy", "shells", "modern"),
        ]);
        let combiner = Combiner::new(MockGenerator::responding(raw), "premium napkin");
        let combos = combiner
            .resolve_with_rng(&locked_stripes_matte(), &catalog(), &mut seeded())
            .unwrap();

        assert_eq!(combos.len(), 3);
        assert_eq!(combos[0].color_palette, "pastel");
        assert_eq!(combos[1].motif, "moons");
        assert_eq!(combos[2].style, "modern");
        assert!(combos.iter().all(|c| c.rationale == "cohesive"));
    }

    #[test]
    fn locked_attributes_hold_in_every_result() {
        let raw = response(vec![
            record("pastel", "stars", "modern"),
            record("neon", "moons", "vintage"),
            record("earthy", "shells", "modern"),
        ]);
        let combiner = Combiner::new(MockGenerator::responding(raw), "premium napkin");
        let combos = combiner
            .resolve_with_rng(&locked_stripes_matte(), &catalog(), &mut seeded())
            .unwrap();

        assert!(combos.iter().all(|c| c.pattern == "stripes" && c.finish == "matte"));
        assert_unique(&combos);
    }

    #[test]
    fn generator_is_called_exactly_once() {
        let mock = MockGenerator::responding(response(vec![
            record("pastel", "stars", "modern"),
            record("pastel", "stars", "modern"),
            record("pastel", "stars", "modern"),
        ]));
        let combiner = Combiner::new(mock, "premium napkin");
        combiner
            .resolve_with_rng(&locked_stripes_matte(), &catalog(), &mut seeded())
            .unwrap();
        assert_eq!(combiner.generator.get_prompts().len(), 1);
    }

    #[test]
    fn prompt_carries_product_type_and_locks() {
        let mock = MockGenerator::failing("offline");
        let combiner = Combiner::new(mock, "cocktail napkin");
        combiner.resolve(&locked_stripes_matte(), &catalog()).unwrap();
        let prompts = combiner.generator.get_prompts();
        assert!(prompts[0].contains("cocktail napkin"));
        assert!(prompts[0].contains("- pattern: \"stripes\""));
    }

    #[test]
    fn duplicates_are_topped_up_to_three() {
        let raw = response(vec![
            record("pastel", "stars", "modern"),
            record("pastel", "stars", "modern"),
            record("pastel", "stars", "modern"),
        ]);
        let combiner = Combiner::new(MockGenerator::responding(raw), "premium napkin");
        let combos = combiner
            .resolve_with_rng(&locked_stripes_matte(), &catalog(), &mut seeded())
            .unwrap();

        assert_eq!(combos.len(), 3);
        assert_unique(&combos);
        assert_eq!(combos[0].rationale, "cohesive");
        assert!(combos[1..].iter().all(|c| c.rationale == TOP_UP_RATIONALE));
        assert!(combos.iter().all(|c| c.pattern == "stripes" && c.finish == "matte"));
        for c in &combos {
            for a in Attribute::ALL {
                assert!(catalog().contains(a, c.get(a)), "{a} = {} off catalog", c.get(a));
            }
        }
    }

    #[test]
    fn top_up_stops_when_space_is_exhausted() {
        let mut sel = Selections::default();
        for a in Attribute::ALL {
            sel.set(a, catalog().values(a)[0].clone());
        }
        let raw = response(vec![
            record("pastel", "stars", "modern"),
            record("pastel", "stars", "modern"),
            record("pastel", "stars", "modern"),
        ]);
        let combiner = Combiner::new(MockGenerator::responding(raw), "premium napkin");
        let combos = combiner.resolve_with_rng(&sel, &catalog(), &mut seeded()).unwrap();
        assert_eq!(combos.len(), 1);
    }

    #[test]
    fn fenced_response_is_accepted() {
        let raw = format!(
            "```json\n{}\n```",
            response(vec![
                record("pastel", "stars", "modern"),
                record("neon", "moons", "vintage"),
                record("earthy", "shells", "modern"),
            ])
        );
        let combiner = Combiner::new(MockGenerator::responding(raw), "premium napkin");
        let combos = combiner
            .resolve_with_rng(&locked_stripes_matte(), &catalog(), &mut seeded())
            .unwrap();
        assert!(combos.iter().all(|c| c.rationale == "cohesive"));
    }

    #[test]
    fn closure_generator_works() {
        let raw = response(vec![
            record("pastel", "stars", "modern"),
            record("neon", "moons", "vintage"),
            record("earthy", "shells", "modern"),
        ]);
        let generator = move |_: &str| -> std::result::Result<String, String> { Ok(raw.clone()) };
        let combos = Combiner::new(generator, "napkin")
            .resolve(&locked_stripes_matte(), &catalog())
            .unwrap();
        assert_eq!(combos.len(), 3);
    }

    // =========================================================================
    // Fallback path
    // =========================================================================

    #[test]
    fn generator_failure_uses_rotation() {
        let combiner = Combiner::new(MockGenerator::failing("timeout"), "premium napkin");
        let combos = combiner.resolve(&locked_stripes_matte(), &catalog()).unwrap();

        assert_eq!(combos.len(), 3);
        assert!(combos.iter().all(|c| c.rationale == FALLBACK_RATIONALE));
        assert_eq!(combos[0].color_palette, "pastel");
        assert_eq!(combos[1].color_palette, "neon");
        assert_eq!(combos[2].color_palette, "earthy");
        assert_eq!(combos[2].style, "modern");
        assert!(combos.iter().all(|c| c.pattern == "stripes" && c.finish == "matte"));
    }

    #[test]
    fn off_catalog_response_uses_fallback() {
        let raw = response(vec![
            record("pastel", "stars", "modern"),
            record("plaid", "moons", "vintage"),
            record("earthy", "shells", "modern"),
        ]);
        let combiner = Combiner::new(MockGenerator::responding(raw), "premium napkin");
        let combos = combiner.resolve(&locked_stripes_matte(), &catalog()).unwrap();
        assert!(combos.iter().all(|c| c.rationale == FALLBACK_RATIONALE));
    }

    #[test]
    fn malformed_response_uses_fallback() {
        let combiner = Combiner::new(MockGenerator::responding("not json at all"), "napkin");
        let combos = combiner.resolve(&Selections::default(), &catalog()).unwrap();
        assert_eq!(combos.len(), 3);
        assert!(combos.iter().all(|c| c.rationale == FALLBACK_RATIONALE));
    }

    #[test]
    fn fallback_is_reproducible() {
        let combiner = Combiner::new(Offline, "premium napkin");
        let first = combiner.resolve(&Selections::default(), &catalog()).unwrap();
        let second = combiner.resolve(&Selections::default(), &catalog()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fallback_tops_up_single_value_catalogs() {
        let catalog = Catalog {
            color_palette: vec!["pastel".into()],
            pattern: vec!["stripes".into()],
            motif: vec!["stars".into()],
            style: vec!["modern".into()],
            finish: vec!["matte".into(), "glossy".into(), "foil".into()],
        };
        // Rotation yields three distinct finishes; nothing to top up.
        let combos = fallback(&Selections::default(), &catalog);
        assert_eq!(combos.len(), 3);

        // With two defaulted lists of length two, rotation gives 2 distinct,
        // enumeration adds the first unseen pair.
        let catalog = Catalog {
            color_palette: vec!["pastel".into(), "neon".into()],
            finish: vec!["matte".into(), "glossy".into()],
            ..catalog
        };
        let sel = Selections::default()
            .with(Attribute::Pattern, "stripes")
            .with(Attribute::Motif, "stars")
            .with(Attribute::Style, "modern");
        let combos = fallback(&sel, &catalog);
        assert_eq!(combos.len(), 3);
        assert_unique(&combos);
        assert_eq!(
            (combos[2].color_palette.as_str(), combos[2].finish.as_str()),
            ("pastel", "glossy")
        );
    }

    #[test]
    fn fallback_returns_fewer_only_when_space_is_small() {
        let catalog = Catalog {
            color_palette: vec!["pastel".into()],
            pattern: vec!["stripes".into()],
            motif: vec!["stars".into()],
            style: vec!["modern".into()],
            finish: vec!["matte".into(), "glossy".into()],
        };
        let combos = fallback(&Selections::default(), &catalog);
        assert_eq!(combos.len(), 2);
        assert_unique(&combos);
    }

    #[test]
    fn all_locked_fallback_is_single() {
        let mut sel = Selections::default();
        for a in Attribute::ALL {
            sel.set(a, "custom");
        }
        let combiner = Combiner::new(Offline, "napkin");
        let combos = combiner.resolve(&sel, &Catalog::default()).unwrap();
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].motif, "custom");
    }

    // =========================================================================
    // Configuration and helpers
    // =========================================================================

    #[test]
    fn empty_catalog_for_default_is_configuration_error() {
        let catalog = Catalog {
            motif: Vec::new(),
            ..catalog()
        };
        let combiner = Combiner::new(MockGenerator::responding("unused"), "napkin");
        let err = combiner.resolve(&Selections::default(), &catalog).unwrap_err();
        assert!(matches!(err, CombineError::Configuration(m) if m.contains("motif")));
        assert!(combiner.generator.get_prompts().is_empty());
    }

    #[test]
    fn empty_catalog_for_locked_attribute_is_fine() {
        let catalog = Catalog {
            pattern: Vec::new(),
            ..catalog()
        };
        let combos = Combiner::new(Offline, "napkin")
            .resolve(&locked_stripes_matte(), &catalog)
            .unwrap();
        assert_eq!(combos.len(), 3);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let a = Combination::from_fn("first", |attr| attr.key().to_string());
        let b = Combination::from_fn("second", |attr| attr.key().to_string());
        let c = Combination::from_fn("other", |attr| format!("{}-x", attr.key()));
        let out = dedupe(vec![a, c, b]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].rationale, "first");
        assert_eq!(out[1].rationale, "other");
    }

    #[test]
    fn reachable_space_counts_distinct_defaulted_values() {
        let catalog = Catalog {
            color_palette: vec!["a".into(), "a".into(), "b".into()],
            ..catalog()
        };
        let sel = locked_stripes_matte();
        // palette 2 distinct, motif 3, style 2.
        assert_eq!(reachable_space(&sel, &catalog), 12);

        let mut all_locked = Selections::default();
        for a in Attribute::ALL {
            all_locked.set(a, "x");
        }
        assert_eq!(reachable_space(&all_locked, &catalog), 1);
    }

    #[test]
    fn explain_trims_generator_text() {
        let combiner = Combiner::new(MockGenerator::responding("  Calm and coastal.\n"), "napkin");
        let combo = Combination::from_fn("", |a| a.key().to_string());
        assert_eq!(combiner.explain(&combo).unwrap(), "Calm and coastal.");
        assert!(combiner.generator.get_prompts()[0].contains("Design Combination"));
    }

    #[test]
    fn explain_surfaces_generator_errors() {
        let combiner = Combiner::new(Offline, "napkin");
        let combo = Combination::from_fn("", |a| a.key().to_string());
        assert!(matches!(
            combiner.explain(&combo),
            Err(GeneratorError::Unavailable(_))
        ));
    }
}
