//! Helpers shared across layers.
//!
//! - [`code_generator`] - Short code candidates (random and sequential base62)
//! - [`url_normalizer`] - Target URL validation and canonicalisation

pub mod code_generator;
pub mod url_normalizer;
