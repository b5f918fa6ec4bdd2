//! Trigger-term lists per signal category.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::config::{ConfigFormat, read_config_file};
use crate::error::{KwcatError, Result};

/// The fixed set of signal categories a token list configuration must define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCategory {
    /// Own-brand tokens.
    KaTokens,
    CompetitorBrands,
    ProprietaryProducts,
    ClassicalFormulations,
    CategoriesFormats,
    NeedStates,
    SupportTerms,
    ServicesTerms,
    CorporateTerms,
    GeoOtherTerms,
    EvalTerms,
    TxnTerms,
    HowtoTerms,
    TrustTerms,
}

impl TokenCategory {
    /// Number of categories.
    pub const COUNT: usize = 14;

    /// All categories, in configuration order.
    pub const ALL: [TokenCategory; TokenCategory::COUNT] = [
        TokenCategory::KaTokens,
        TokenCategory::CompetitorBrands,
        TokenCategory::ProprietaryProducts,
        TokenCategory::ClassicalFormulations,
        TokenCategory::CategoriesFormats,
        TokenCategory::NeedStates,
        TokenCategory::SupportTerms,
        TokenCategory::ServicesTerms,
        TokenCategory::CorporateTerms,
        TokenCategory::GeoOtherTerms,
        TokenCategory::EvalTerms,
        TokenCategory::TxnTerms,
        TokenCategory::HowtoTerms,
        TokenCategory::TrustTerms,
    ];

    /// Configuration key for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenCategory::KaTokens => "ka_tokens",
            TokenCategory::CompetitorBrands => "competitor_brands",
            TokenCategory::ProprietaryProducts => "proprietary_products",
            TokenCategory::ClassicalFormulations => "classical_formulations",
            TokenCategory::CategoriesFormats => "categories_formats",
            TokenCategory::NeedStates => "need_states",
            TokenCategory::SupportTerms => "support_terms",
            TokenCategory::ServicesTerms => "services_terms",
            TokenCategory::CorporateTerms => "corporate_terms",
            TokenCategory::GeoOtherTerms => "geo_other_terms",
            TokenCategory::EvalTerms => "eval_terms",
            TokenCategory::TxnTerms => "txn_terms",
            TokenCategory::HowtoTerms => "howto_terms",
            TokenCategory::TrustTerms => "trust_terms",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenCategory {
    type Err = KwcatError;

    fn from_str(s: &str) -> Result<Self> {
        TokenCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| KwcatError::config(format!("unknown token category: {s}")))
    }
}

/// Immutable trigger-term lists, one per [`TokenCategory`].
///
/// Terms are stored lowercase. Built once per run and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLists {
    terms: [Vec<String>; TokenCategory::COUNT],
}

impl TokenLists {
    /// Lists with every category present but empty.
    pub fn empty() -> Self {
        Self {
            terms: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// Replace the terms of one category.
    pub fn with_terms<I, S>(mut self, category: TokenCategory, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.terms[category.index()] = terms
            .into_iter()
            .map(|t| t.as_ref().to_lowercase())
            .collect();
        self
    }

    /// Build from a category-name → terms map.
    ///
    /// Every required category must be present; unknown names are ignored.
    pub fn from_map(map: HashMap<String, Vec<String>>) -> Result<Self> {
        let missing: Vec<&str> = TokenCategory::ALL
            .iter()
            .filter(|c| !map.contains_key(c.as_str()))
            .map(|c| c.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(KwcatError::config(format!(
                "missing token list categories: {}",
                missing.join(", ")
            )));
        }

        let mut lists = TokenLists::empty();
        for (name, terms) in map {
            let Ok(category) = name.parse::<TokenCategory>() else {
                debug!("Ignoring unknown token list category '{name}'");
                continue;
            };
            if terms.iter().any(|t| t.is_empty()) {
                warn!("Token list '{name}' contains an empty term; it matches every keyword");
            }
            lists = lists.with_terms(category, terms);
        }

        Ok(lists)
    }

    /// Build from a parsed configuration document.
    ///
    /// Only the fourteen category keys are read and each must hold a list of
    /// strings. Any other key is skipped whatever its value, so a list file
    /// may carry metadata such as `version: 2`.
    ///
    /// # Errors
    ///
    /// Returns [`KwcatError::Config`] when the document is not a mapping, a
    /// category is missing, or a category is not a list of strings.
    pub fn from_document(document: &Value) -> Result<Self> {
        let Some(mapping) = document.as_mapping() else {
            return Err(KwcatError::config(
                "token lists must be a mapping of category name to terms",
            ));
        };

        let mut map = HashMap::with_capacity(TokenCategory::COUNT);
        for category in TokenCategory::ALL {
            let Some(value) = mapping.get(category.as_str()) else {
                continue;
            };
            let terms: Vec<String> = serde_yaml::from_value(value.clone()).map_err(|e| {
                KwcatError::config(format!(
                    "token list '{category}' must be a list of strings: {e}"
                ))
            })?;
            map.insert(category.as_str().to_string(), terms);
        }

        for key in mapping.keys() {
            let known = key.as_str().is_some_and(|k| k.parse::<TokenCategory>().is_ok());
            if !known {
                debug!("Ignoring token list key {key:?}");
            }
        }

        Self::from_map(map)
    }

    /// Parse lists from a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::from_document(&ConfigFormat::Yaml.parse(content)?)
    }

    /// Parse lists from a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::from_document(&ConfigFormat::Json.parse(content)?)
    }

    /// Load lists from a `.yaml`, `.yml` or `.json` file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let lists = Self::from_document(&read_config_file::<Value>(path)?)?;
        info!(
            "Loaded token lists from {} ({} categories, {} terms)",
            path.display(),
            TokenCategory::COUNT,
            lists.total_terms()
        );
        Ok(lists)
    }

    /// Terms configured for a category.
    pub fn terms(&self, category: TokenCategory) -> &[String] {
        &self.terms[category.index()]
    }

    /// Total number of terms across categories.
    pub fn total_terms(&self) -> usize {
        self.terms.iter().map(Vec::len).sum()
    }
}

impl Default for TokenLists {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_map() -> HashMap<String, Vec<String>> {
        TokenCategory::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), Vec::new()))
            .collect()
    }

    #[test]
    fn test_category_round_trip_names() {
        for category in TokenCategory::ALL {
            assert_eq!(category.as_str().parse::<TokenCategory>().unwrap(), category);
        }
        assert!("brand_tokens".parse::<TokenCategory>().is_err());
    }

    #[test]
    fn test_category_index_matches_order() {
        for (i, category) in TokenCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_missing_categories_fail_at_load() {
        let mut map = full_map();
        map.remove("eval_terms");
        map.remove("trust_terms");

        let err = TokenLists::from_map(map).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, KwcatError::Config(_)));
        assert!(message.contains("eval_terms"));
        assert!(message.contains("trust_terms"));
    }

    #[test]
    fn test_unknown_categories_are_ignored() {
        let mut map = full_map();
        map.insert("seasonal_terms".to_string(), vec!["diwali".to_string()]);
        map.insert("ka_tokens".to_string(), vec!["kerala ayurveda".to_string()]);

        let lists = TokenLists::from_map(map).unwrap();
        assert_eq!(lists.total_terms(), 1);
        assert_eq!(lists.terms(TokenCategory::KaTokens), ["kerala ayurveda"]);
    }

    #[test]
    fn test_terms_are_lowercased() {
        let lists = TokenLists::empty().with_terms(TokenCategory::CompetitorBrands, ["Himalaya"]);
        assert_eq!(lists.terms(TokenCategory::CompetitorBrands), ["himalaya"]);
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
ka_tokens: ["kerala ayurveda", "ka "]
competitor_brands: [himalaya, dabur]
proprietary_products: []
classical_formulations: [triphala]
categories_formats: [capsules]
need_states: [sleep]
support_terms: [refund]
services_terms: [clinic]
corporate_terms: [jobs]
geo_other_terms: [usa]
eval_terms: [best]
txn_terms: [buy]
howto_terms: [how to]
trust_terms: [side effects]
"#;
        let lists = TokenLists::from_yaml_str(yaml).unwrap();
        assert_eq!(lists.terms(TokenCategory::CompetitorBrands).len(), 2);
        assert_eq!(lists.terms(TokenCategory::ProprietaryProducts).len(), 0);
        assert_eq!(lists.total_terms(), 15);
    }

    fn full_yaml() -> String {
        TokenCategory::ALL
            .iter()
            .map(|c| format!("{}: []\n", c.as_str()))
            .collect()
    }

    #[test]
    fn test_scalar_extra_key_is_ignored() {
        let yaml = format!("version: 2\n{}", full_yaml());
        let lists = TokenLists::from_yaml_str(&yaml).unwrap();
        assert_eq!(lists.total_terms(), 0);
    }

    #[test]
    fn test_nested_extra_key_is_ignored() {
        let yaml = format!("meta:\n  owner: seo\n  tags: [a, b]\n{}", full_yaml())
            .replace("txn_terms: []", "txn_terms: [Buy]");
        let lists = TokenLists::from_yaml_str(&yaml).unwrap();
        assert_eq!(lists.terms(TokenCategory::TxnTerms), ["buy"]);

        let json = r#"{"meta": {"owner": "seo"}, "version": 2}"#;
        let err = TokenLists::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("ka_tokens"));
    }

    #[test]
    fn test_category_with_wrong_type_is_rejected() {
        let yaml = full_yaml().replace("eval_terms: []", "eval_terms: best");
        let err = TokenLists::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, KwcatError::Config(_)));
        assert!(err.to_string().contains("eval_terms"));
    }

    #[test]
    fn test_document_must_be_a_mapping() {
        let err = TokenLists::from_yaml_str("- ka_tokens\n- eval_terms\n").unwrap_err();
        assert!(matches!(err, KwcatError::Config(_)));
    }

    #[test]
    fn test_from_json_str_missing_category() {
        let err = TokenLists::from_json_str(r#"{"ka_tokens": ["kerala ayurveda"]}"#).unwrap_err();
        assert!(matches!(err, KwcatError::Config(_)));
    }
}
