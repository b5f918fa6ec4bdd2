//! Text analysis for keyword matching.
//!
//! Keywords are canonicalised once by the [`normalizer`] before any signal
//! detection runs, so every trigger-term test sees the same text.

pub mod normalizer;

pub use normalizer::{coerce_keyword, normalize};
