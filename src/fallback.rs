//! Secondary classifier for keywords the rules could not place confidently.
//!
//! The batch orchestrator sends only the review subset (unclassified or
//! low-confidence rows) to a [`FallbackClassifier`], in fixed-size batches,
//! together with the [`Taxonomy`](crate::config::Taxonomy) so the returned
//! values stay inside the same enumerations the rules use.
//!
//! - [`FallbackClassifier`]: async trait implemented by every backend
//! - [`FallbackItem`]: the authoritative override returned per keyword
//! - [`OpenAIFallbackClassifier`]: backend on the OpenAI Responses API

pub mod classifier;
pub mod openai;
pub mod types;

pub use classifier::FallbackClassifier;
pub use openai::OpenAIFallbackClassifier;
pub use types::FallbackItem;
