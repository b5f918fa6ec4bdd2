//! Confidence scoring for rule classifications.

use crate::policy::signals::SignalVector;
use crate::policy::types::Bucket;

/// Confidence of a rule hit with no ambiguity.
pub const BASE_CONFIDENCE: f64 = 0.85;

/// Confidence assigned when no rule fires.
pub const UNCLASSIFIED_CONFIDENCE: f64 = 0.2;

/// Upper bound applied to ambiguous keywords.
pub const AMBIGUITY_CAP: f64 = 0.55;

/// Number of conflicting content signals that makes a keyword ambiguous.
pub const AMBIGUITY_THRESHOLD: usize = 3;

pub const UNCLASSIFIED_NOTE: &str = "Unclassified by rules";
pub const AMBIGUITY_NOTE: &str = "Multi-signal ambiguity";

/// Confidence value with its diagnostic notes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceAssessment {
    pub confidence: f64,
    pub notes: Vec<&'static str>,
}

impl ConfidenceAssessment {
    /// Notes joined with `"; "`.
    pub fn notes_text(&self) -> String {
        self.notes.join("; ")
    }
}

/// Score a resolved bucket.
///
/// Starts at [`BASE_CONFIDENCE`], drops to [`UNCLASSIFIED_CONFIDENCE`] when
/// no rule fired, and is capped at [`AMBIGUITY_CAP`] when at least
/// [`AMBIGUITY_THRESHOLD`] content signals fired on a bucket that is not a
/// not-fit route. Each adjustment adds its note.
pub fn assess(bucket: Bucket, signals: &SignalVector) -> ConfidenceAssessment {
    let mut confidence = BASE_CONFIDENCE;
    let mut notes = Vec::new();

    if bucket.is_unclassified() {
        confidence = UNCLASSIFIED_CONFIDENCE;
        notes.push(UNCLASSIFIED_NOTE);
    }

    if signals.ambiguity_count() >= AMBIGUITY_THRESHOLD && !bucket.is_not_fit() {
        confidence = confidence.min(AMBIGUITY_CAP);
        notes.push(AMBIGUITY_NOTE);
    }

    ConfidenceAssessment { confidence, notes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenCategory::*;

    fn ambiguous() -> SignalVector {
        SignalVector::from_categories([ClassicalFormulations, NeedStates, CategoriesFormats])
    }

    #[test]
    fn test_base_confidence() {
        let assessment = assess(Bucket::Ka1, &SignalVector::from_categories([KaTokens]));
        assert_eq!(assessment.confidence, BASE_CONFIDENCE);
        assert!(assessment.notes.is_empty());
        assert_eq!(assessment.notes_text(), "");
    }

    #[test]
    fn test_unclassified() {
        let assessment = assess(Bucket::Unclassified, &SignalVector::default());
        assert_eq!(assessment.confidence, UNCLASSIFIED_CONFIDENCE);
        assert_eq!(assessment.notes_text(), "Unclassified by rules");
    }

    #[test]
    fn test_ambiguity_caps_confidence() {
        let assessment = assess(Bucket::Nb1, &ambiguous());
        assert_eq!(assessment.confidence, AMBIGUITY_CAP);
        assert_eq!(assessment.notes_text(), "Multi-signal ambiguity");
    }

    #[test]
    fn test_ambiguity_below_threshold() {
        let signals = SignalVector::from_categories([ClassicalFormulations, NeedStates]);
        assert_eq!(assess(Bucket::Nb1, &signals).confidence, BASE_CONFIDENCE);
    }

    #[test]
    fn test_not_fit_buckets_skip_ambiguity() {
        for bucket in [Bucket::KaNf1, Bucket::KaNf2, Bucket::KaNf3] {
            let assessment = assess(bucket, &ambiguous());
            assert_eq!(assessment.confidence, BASE_CONFIDENCE);
            assert!(assessment.notes.is_empty());
        }
    }

    #[test]
    fn test_notes_join_when_both_apply() {
        // Unreachable through the rule list (three content signals always place
        // a bucket), but the scorer composes the two notes independently.
        let assessment = assess(Bucket::Unclassified, &ambiguous());
        assert_eq!(assessment.confidence, UNCLASSIFIED_CONFIDENCE);
        assert_eq!(
            assessment.notes_text(),
            "Unclassified by rules; Multi-signal ambiguity"
        );
    }
}
