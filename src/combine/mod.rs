//! Design-combination resolution.
//!
//! Turns partial user selections into three complete, distinct combinations
//! of the five design attributes.
//!
//! | Step | Where | Outcome on failure |
//! |---|---|---|
//! | Catalog check | [`resolver`] | [`CombineError::Configuration`] |
//! | Prompt + single generator call | [`prompt`], [`generator`] | local fallback |
//! | Fence strip + validation | [`validate`] | local fallback |
//! | De-duplicate, random top-up | [`resolver`] | fewer than 3 only if the space is exhausted |
//! | Local fallback (rotation + enumeration) | [`resolver::fallback`] | none, deterministic |

pub mod generator;
pub mod prompt;
pub mod resolver;
pub mod types;
pub mod validate;

pub use generator::{GeneratorError, Offline, Replay, TextGenerator};
pub use resolver::{CombineError, Combiner};
pub use types::{Attribute, Catalog, Combination, Selection, Selections, Signature};
pub use validate::ValidationError;
