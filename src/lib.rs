//! # Napkin Atelier
//!
//! Post-processing and design-combination engine for generated napkin
//! artwork. Two independent engines sit behind a small CLI:
//!
//! ```text
//! enhance   source image  →  low / medium / high variants
//! combine   selections    →  three distinct design combinations
//! ```
//!
//! Both are synchronous and keep no state between calls. Image decoding,
//! file naming and the text-generation provider live at the edges; the
//! engines only see pixel buffers, selections, a catalog and an injected
//! [`combine::TextGenerator`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`enhance`] | Five-stage enhancement: white point, CLAHE, vibrance, unsharp, clamp |
//! | [`combine`] | Prompt, validate, de-duplicate and top up; deterministic local fallback |
//! | [`config`] | `config.toml` loading, validation and merging onto stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fixed Strength Table
//!
//! The three strengths map to a constant parameter table
//! ([`enhance::Strength::params`]). They are not configurable so that the
//! same source always yields the same three variants.
//!
//! ## One Generator Call, One Fallback
//!
//! [`combine::Combiner::resolve`] calls its generator once and never retries.
//! Any failure, whether the call itself or a response that does not validate
//! against the catalog, switches to a deterministic rotation over the catalog.
//! Timeouts and retries belong to whoever supplies the generator.

pub mod combine;
pub mod config;
pub mod enhance;
pub mod output;
