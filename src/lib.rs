//! # kwcat
//!
//! Rule-first search keyword categorizer for marketing planning.
//!
//! Every keyword is normalized, scanned for signal categories from the
//! configured token lists, placed in exactly one bucket by an ordered rule
//! table, and given an intent, funnel stage, paid and SEO suggestions, a
//! negative-keyword flag and a confidence score. Low-confidence rows can be
//! reviewed by a pluggable fallback classifier.
//!
//! ## Features
//!
//! - Deterministic, pure rule policy ([`policy`])
//! - YAML/JSON token lists and taxonomy ([`config`])
//! - Parallel batch classification of CSV and Excel files ([`batch`])
//! - Optional OpenAI fallback for unclassified rows ([`fallback`])
//! - CLI and HTTP API

pub mod analysis;
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod fallback;
pub mod policy;
pub mod server;

pub mod prelude {
    pub use crate::batch::{BatchOptions, BatchOrchestrator, BatchReport, KeywordTable};
    pub use crate::config::{Taxonomy, TokenCategory, TokenLists};
    pub use crate::error::{KwcatError, Result};
    pub use crate::fallback::{FallbackClassifier, FallbackItem};
    pub use crate::policy::{ClassificationResult, KeywordClassifier, classify_keyword};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
