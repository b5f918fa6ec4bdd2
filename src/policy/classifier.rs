//! Single entry point of the rule policy.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::analysis::{coerce_keyword, normalize};
use crate::config::{TokenCategory, TokenLists};
use crate::policy::attributes::DerivedAttributes;
use crate::policy::confidence;
use crate::policy::resolver::{matching_rule, resolve_bucket};
use crate::policy::signals::{PhraseSignals, SignalVector};
use crate::policy::types::{Bucket, ClassificationResult};

/// Rule-based keyword classifier.
///
/// Holds the token lists behind an `Arc`; cloning is cheap and clones can be
/// moved onto worker threads. Classification is a pure function of the
/// keyword and the lists.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    lists: Arc<TokenLists>,
}

/// Diagnostic trace of one classification.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub keyword: String,
    pub normalized: String,
    pub active_signals: Vec<TokenCategory>,
    pub phrases: PhraseSignals,
    /// Name of the rule that fired, `None` for `UNCLASSIFIED`.
    pub rule: Option<&'static str>,
    pub result: ClassificationResult,
}

impl KeywordClassifier {
    pub fn new(lists: Arc<TokenLists>) -> Self {
        Self { lists }
    }

    pub fn lists(&self) -> &TokenLists {
        &self.lists
    }

    /// Classify one keyword.
    pub fn classify(&self, keyword: &str) -> ClassificationResult {
        classify_keyword(keyword, &self.lists)
    }

    /// Classify a keyword that may not be text, such as a JSON number.
    pub fn classify_value(&self, keyword: &Value) -> ClassificationResult {
        self.classify(&coerce_keyword(keyword))
    }

    /// Classify one keyword and report how the decision was reached.
    pub fn explain(&self, keyword: &str) -> Explanation {
        let normalized = normalize(keyword);
        let signals = SignalVector::detect(&normalized, &self.lists);
        let rule = matching_rule(&signals);
        let bucket = rule.map(|r| r.bucket).unwrap_or(Bucket::Unclassified);

        Explanation {
            keyword: keyword.to_string(),
            active_signals: signals.active(),
            phrases: signals.phrases,
            rule: rule.map(|r| r.name),
            result: build_result(bucket, &signals),
            normalized,
        }
    }
}

/// Classify one keyword against the given lists.
pub fn classify_keyword(keyword: &str, lists: &TokenLists) -> ClassificationResult {
    classify_signals(&SignalVector::detect(&normalize(keyword), lists))
}

/// Classify an already detected signal vector.
///
/// Everything after signal detection depends only on the vector, so this is
/// the whole policy minus text matching.
pub fn classify_signals(signals: &SignalVector) -> ClassificationResult {
    build_result(resolve_bucket(signals), signals)
}

fn build_result(bucket: Bucket, signals: &SignalVector) -> ClassificationResult {
    let derived = DerivedAttributes::derive(bucket, signals);
    let assessment = confidence::assess(bucket, signals);

    ClassificationResult {
        bucket,
        intent: derived.intent,
        stage: derived.intent.stage(),
        paid_activation: derived.paid_activation,
        seo_asset: derived.seo_asset,
        negative: derived.negative,
        confidence: assessment.confidence,
        notes: assessment.notes_text(),
    }
}
