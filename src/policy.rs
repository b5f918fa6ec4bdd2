//! The keyword classification policy.
//!
//! A keyword flows through a fixed pipeline:
//!
//! ```text
//! keyword → normalize → SignalVector → bucket → attributes → confidence → ClassificationResult
//! ```
//!
//! - [`signals`]: one boolean per token category, by substring containment
//! - [`resolver`]: ordered first-match-wins rule list picking one [`Bucket`]
//! - [`attributes`]: intent, stage, paid/SEO suggestions, negative flag
//! - [`confidence`]: confidence value and diagnostic notes
//! - [`classifier`]: the [`KeywordClassifier`] entry point
//!
//! The whole pipeline is a pure function of the keyword and the
//! [`TokenLists`](crate::config::TokenLists); it keeps no state and can run on
//! any number of threads at once.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kwcat::config::{TokenCategory, TokenLists};
//! use kwcat::policy::{Bucket, KeywordClassifier};
//!
//! let lists = TokenLists::empty()
//!     .with_terms(TokenCategory::KaTokens, ["kerala ayurveda"])
//!     .with_terms(TokenCategory::SupportTerms, ["refund"]);
//! let classifier = KeywordClassifier::new(Arc::new(lists));
//!
//! let result = classifier.classify("Kerala Ayurveda refund policy");
//! assert_eq!(result.bucket, Bucket::Ka7);
//! ```

pub mod attributes;
pub mod classifier;
pub mod confidence;
pub mod resolver;
pub mod signals;
pub mod types;

pub use classifier::{Explanation, KeywordClassifier, classify_keyword, classify_signals};
pub use resolver::{BUCKET_RULES, BucketRule, resolve_bucket};
pub use signals::{PhraseSignals, SignalVector};
pub use types::{
    Bucket, ClassificationResult, Intent, NegativeClassification, PaidActivation, SeoAsset, Stage,
};
