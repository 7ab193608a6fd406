//! The injected text-generation seam.
//!
//! The combiner never talks to a provider itself. Anything that turns a
//! prompt into text implements [`TextGenerator`]: a provider client, a
//! replayed response, or a closure in tests.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Text generator unavailable: {0}")]
    Unavailable(String),
    #[error("Text generation failed: {0}")]
    Failed(String),
}

/// Prompt in, raw response text out.
///
/// Implementations may block. The combiner calls [`generate`](Self::generate)
/// at most once per resolution and never retries.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}

impl<F, E> TextGenerator for F
where
    F: Fn(&str) -> Result<String, E> + Send + Sync,
    E: std::fmt::Display,
{
    fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        self(prompt).map_err(|e| GeneratorError::Failed(e.to_string()))
    }
}

/// Generator for offline runs: always unavailable, so resolution takes the
/// deterministic fallback path.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl TextGenerator for Offline {
    fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
        Err(GeneratorError::Unavailable("no text generator configured".into()))
    }
}

/// Generator that replays one saved response for every prompt.
#[derive(Debug, Clone)]
pub struct Replay {
    response: String,
}

impl Replay {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl TextGenerator for Replay {
    fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
        Ok(self.response.clone())
    }
}
