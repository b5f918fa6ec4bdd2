//! Valid taxonomy enumerations shared with the fallback classifier.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigFormat, read_config_file};
use crate::error::{KwcatError, Result};
use crate::policy::{Bucket, Intent, Stage};

/// Valid bucket ids, intents and stages.
///
/// The rule policy and the fallback classifier must both draw their outputs
/// from these sets. A taxonomy may list buckets the rules never emit (they
/// can still be chosen by the fallback), but it must contain every value the
/// rules can emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub buckets: Vec<String>,
    pub intents: Vec<String>,
    pub stages: Vec<String>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            buckets: Bucket::ALL
                .iter()
                .filter(|b| !b.is_unclassified())
                .map(|b| b.as_str().to_string())
                .collect(),
            intents: Intent::ALL.iter().map(|i| i.as_str().to_string()).collect(),
            stages: Stage::ALL.iter().map(|s| s.as_str().to_string()).collect(),
        }
    }
}

impl Taxonomy {
    /// Parse and validate a taxonomy from a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let taxonomy: Taxonomy = ConfigFormat::Yaml.parse(content)?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Load and validate a taxonomy file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let taxonomy: Taxonomy = read_config_file(path)?;
        taxonomy.validate()?;
        info!(
            "Loaded taxonomy from {} ({} buckets, {} intents, {} stages)",
            path.display(),
            taxonomy.buckets.len(),
            taxonomy.intents.len(),
            taxonomy.stages.len()
        );
        Ok(taxonomy)
    }

    /// Load from a path when given, otherwise use the built-in enumerations.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check that every value the rule policy can emit is listed.
    pub fn validate(&self) -> Result<()> {
        let missing_buckets: Vec<&str> = Bucket::ALL
            .iter()
            .filter(|b| !b.is_unclassified() && !self.contains_bucket(b.as_str()))
            .map(|b| b.as_str())
            .collect();
        let missing_intents: Vec<&str> = Intent::ALL
            .iter()
            .filter(|i| !self.contains_intent(i.as_str()))
            .map(|i| i.as_str())
            .collect();
        let missing_stages: Vec<&str> = Stage::ALL
            .iter()
            .filter(|s| !self.contains_stage(s.as_str()))
            .map(|s| s.as_str())
            .collect();

        let mut problems = Vec::new();
        if !missing_buckets.is_empty() {
            problems.push(format!("buckets [{}]", missing_buckets.join(", ")));
        }
        if !missing_intents.is_empty() {
            problems.push(format!("intents [{}]", missing_intents.join(", ")));
        }
        if !missing_stages.is_empty() {
            problems.push(format!("stages [{}]", missing_stages.join(", ")));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(KwcatError::config(format!(
                "taxonomy is missing values the rule policy emits: {}",
                problems.join("; ")
            )))
        }
    }

    /// `UNCLASSIFIED` is always accepted.
    pub fn contains_bucket(&self, bucket_id: &str) -> bool {
        bucket_id == Bucket::Unclassified.as_str() || self.buckets.iter().any(|b| b == bucket_id)
    }

    pub fn contains_intent(&self, intent: &str) -> bool {
        self.intents.iter().any(|i| i == intent)
    }

    pub fn contains_stage(&self, stage: &str) -> bool {
        self.stages.iter().any(|s| s == stage)
    }
}
