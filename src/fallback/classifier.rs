//! Fallback classifier trait definition.

use async_trait::async_trait;

use crate::config::Taxonomy;
use crate::error::Result;
use crate::fallback::types::FallbackItem;

/// Secondary classifier invoked for the review subset of a batch.
///
/// Implementations return at most one item per keyword; keywords they cannot
/// handle may simply be left out of the result.
#[async_trait]
pub trait FallbackClassifier: Send + Sync {
    /// Classify a batch of raw keywords within the given taxonomy.
    async fn classify_batch(
        &self,
        keywords: &[String],
        taxonomy: &Taxonomy,
    ) -> Result<Vec<FallbackItem>>;

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}
