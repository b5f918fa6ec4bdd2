//! Configuration loading for the classification policy.
//!
//! Two documents drive a run:
//!
//! - [`token_lists::TokenLists`]: trigger terms per signal category
//! - [`taxonomy::Taxonomy`]: valid bucket ids, intents and stages
//!
//! Both are read once, validated, and then shared read-only (behind an
//! `Arc`) by every classification in the run. Any validation failure is a
//! fatal [`KwcatError::Config`](crate::error::KwcatError::Config) raised
//! before a single keyword is processed.

pub mod taxonomy;
pub mod token_lists;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{KwcatError, Result};

pub use taxonomy::Taxonomy;
pub use token_lists::{TokenCategory, TokenLists};

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            _ => Err(KwcatError::config(format!(
                "unsupported configuration file '{}': expected .yaml, .yml or .json",
                path.display()
            ))),
        }
    }

    /// Parse a document in this format.
    pub fn parse<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        match self {
            ConfigFormat::Yaml => Ok(serde_yaml::from_str(content)?),
            ConfigFormat::Json => Ok(serde_json::from_str(content)?),
        }
    }
}

/// Read and parse a configuration file, picking the format by extension.
pub(crate) fn read_config_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|e| {
        KwcatError::config(format!("cannot read '{}': {}", path.display(), e))
    })?;
    format.parse(&content).map_err(|e| {
        KwcatError::config(format!("cannot parse '{}': {}", path.display(), e))
    })
}
