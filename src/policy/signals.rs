//! Signal detection over normalized keyword text.
//!
//! A category fires when any of its terms occurs as a literal substring of
//! the normalized keyword. This is substring containment, not word matching:
//! a short term such as `"ka "` can fire inside an unrelated phrase. Existing
//! keyword sets are classified against this behaviour, so it is kept as is.

use serde::{Deserialize, Serialize};

use crate::config::{TokenCategory, TokenLists};

/// Literal comparison phrases consulted by the evaluation branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseSignals {
    pub vs: bool,
    pub versus: bool,
    pub comparison: bool,
}

impl PhraseSignals {
    /// Look for the comparison phrases in normalized text.
    pub fn detect(normalized: &str) -> Self {
        Self {
            vs: normalized.contains("vs"),
            versus: normalized.contains("versus"),
            comparison: normalized.contains("comparison"),
        }
    }

    /// Whether any comparison phrase is present.
    pub fn any(&self) -> bool {
        self.vs || self.versus || self.comparison
    }
}

/// One boolean flag per token category, plus the comparison phrases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalVector {
    flags: [bool; TokenCategory::COUNT],
    pub phrases: PhraseSignals,
}

impl SignalVector {
    /// Evaluate every category against normalized text.
    pub fn detect(normalized: &str, lists: &TokenLists) -> Self {
        let mut flags = [false; TokenCategory::COUNT];
        for category in TokenCategory::ALL {
            flags[category.index()] = lists
                .terms(category)
                .iter()
                .any(|term| normalized.contains(term.as_str()));
        }

        Self {
            flags,
            phrases: PhraseSignals::detect(normalized),
        }
    }

    /// Build a vector with exactly the given categories set.
    pub fn from_categories<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = TokenCategory>,
    {
        let mut signals = Self::default();
        for category in categories {
            signals.flags[category.index()] = true;
        }
        signals
    }

    /// Set the comparison phrases.
    pub fn with_phrases(mut self, phrases: PhraseSignals) -> Self {
        self.phrases = phrases;
        self
    }

    /// Whether a category fired.
    pub fn has(&self, category: TokenCategory) -> bool {
        self.flags[category.index()]
    }

    /// Categories whose flag is set, in configuration order.
    pub fn active(&self) -> Vec<TokenCategory> {
        TokenCategory::ALL
            .iter()
            .copied()
            .filter(|c| self.has(*c))
            .collect()
    }

    /// `ka_tokens` fired.
    pub fn own_brand(&self) -> bool {
        self.has(TokenCategory::KaTokens)
    }

    /// `competitor_brands` fired.
    pub fn competitor(&self) -> bool {
        self.has(TokenCategory::CompetitorBrands)
    }

    /// Own brand or competitor brand present.
    pub fn any_brand(&self) -> bool {
        self.own_brand() || self.competitor()
    }

    pub fn proprietary(&self) -> bool {
        self.has(TokenCategory::ProprietaryProducts)
    }

    pub fn formulation(&self) -> bool {
        self.has(TokenCategory::ClassicalFormulations)
    }

    pub fn category_format(&self) -> bool {
        self.has(TokenCategory::CategoriesFormats)
    }

    pub fn need_state(&self) -> bool {
        self.has(TokenCategory::NeedStates)
    }

    pub fn support(&self) -> bool {
        self.has(TokenCategory::SupportTerms)
    }

    pub fn services(&self) -> bool {
        self.has(TokenCategory::ServicesTerms)
    }

    pub fn corporate(&self) -> bool {
        self.has(TokenCategory::CorporateTerms)
    }

    pub fn geo_other(&self) -> bool {
        self.has(TokenCategory::GeoOtherTerms)
    }

    pub fn eval(&self) -> bool {
        self.has(TokenCategory::EvalTerms)
    }

    pub fn transactional(&self) -> bool {
        self.has(TokenCategory::TxnTerms)
    }

    pub fn howto(&self) -> bool {
        self.has(TokenCategory::HowtoTerms)
    }

    pub fn trust(&self) -> bool {
        self.has(TokenCategory::TrustTerms)
    }

    /// Number of content signals that pull a keyword in different directions.
    pub fn ambiguity_count(&self) -> usize {
        [
            self.formulation(),
            self.need_state(),
            self.category_format(),
            self.howto(),
            self.trust(),
        ]
        .iter()
        .filter(|flag| **flag)
        .count()
    }
}
