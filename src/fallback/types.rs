//! Types exchanged with the fallback classifier.

use serde::{Deserialize, Serialize};

use crate::config::Taxonomy;

/// Override returned by the fallback classifier for one keyword.
///
/// Field names and the `Y`/`N` flag follow the structured-output schema the
/// classifier is asked to fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackItem {
    pub keyword: String,
    pub bucket_id: String,
    pub intent: String,
    pub stage: String,
    pub is_negative: String,
    pub negative_type: String,
    pub negative_theme: String,
    pub notes: String,
}

impl FallbackItem {
    /// Reasons this item cannot be applied under `taxonomy`, empty when valid.
    pub fn violations(&self, taxonomy: &Taxonomy) -> Vec<String> {
        let mut violations = Vec::new();
        if !taxonomy.contains_bucket(&self.bucket_id) {
            violations.push(format!("unknown bucket '{}'", self.bucket_id));
        }
        if !taxonomy.contains_intent(&self.intent) {
            violations.push(format!("unknown intent '{}'", self.intent));
        }
        if !taxonomy.contains_stage(&self.stage) {
            violations.push(format!("unknown stage '{}'", self.stage));
        }
        if self.is_negative != "Y" && self.is_negative != "N" {
            violations.push(format!("is_negative must be Y or N, got '{}'", self.is_negative));
        }
        violations
    }
}
