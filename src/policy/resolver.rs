//! Bucket resolution.
//!
//! The decision policy is one ordered list of `predicate → bucket` rules
//! evaluated top-down; the first rule whose predicate holds picks the bucket.
//! Order is the only tie-break, so every rule may assume that all rules above
//! it did not fire (e.g. brand-led rules never see an evaluation keyword,
//! competitor-led rules never see an own-brand keyword).
//!
//! | Group | Rules |
//! |---|---|
//! | evaluation-led | `CMP-2`, `CMP-1`, `CMP-3` |
//! | brand-led | `KA-NF2`, `KA-NF1`, `KA-NF3`, `KA-3`, `KA-4`, `KA-NS`, `KA-6`, `KA-7`, `KA-1` |
//! | competitor-led | `COMP-NS`, `COMP-2`, `COMP-1` |
//! | proprietary | `OWN-1` |
//! | non-brand | `NB-6`, `NB-5`, `NB-1`, `NB-2`, `NB-4` |
//!
//! No rule firing yields [`Bucket::Unclassified`].

use crate::policy::signals::SignalVector;
use crate::policy::types::Bucket;

/// A single entry of the ordered decision list.
#[derive(Debug, Clone, Copy)]
pub struct BucketRule {
    /// Stable rule name, reported by `explain`.
    pub name: &'static str,
    pub bucket: Bucket,
    predicate: fn(&SignalVector) -> bool,
}

impl BucketRule {
    const fn new(name: &'static str, bucket: Bucket, predicate: fn(&SignalVector) -> bool) -> Self {
        Self {
            name,
            bucket,
            predicate,
        }
    }

    /// Whether this rule fires for the signals, ignoring rules above it.
    pub fn matches(&self, signals: &SignalVector) -> bool {
        (self.predicate)(signals)
    }
}

/// The ordered decision list.
pub static BUCKET_RULES: &[BucketRule] = &[
    BucketRule::new("eval.compare_formulation_brand", Bucket::Cmp2, |s| {
        s.eval() && s.phrases.any() && s.formulation() && s.any_brand()
    }),
    BucketRule::new("eval.compare_brand", Bucket::Cmp1, |s| {
        s.eval() && s.phrases.any() && s.any_brand()
    }),
    BucketRule::new("eval.generic", Bucket::Cmp3, |s| s.eval()),
    BucketRule::new("brand.corporate", Bucket::KaNf2, |s| {
        s.own_brand() && s.corporate()
    }),
    BucketRule::new("brand.services", Bucket::KaNf1, |s| {
        s.own_brand() && s.services()
    }),
    BucketRule::new("brand.geo_other", Bucket::KaNf3, |s| {
        s.own_brand() && s.geo_other()
    }),
    BucketRule::new("brand.proprietary", Bucket::Ka3, |s| {
        s.own_brand() && s.proprietary()
    }),
    BucketRule::new("brand.formulation", Bucket::Ka4, |s| {
        s.own_brand() && s.formulation()
    }),
    BucketRule::new("brand.need_state", Bucket::KaNs, |s| {
        s.own_brand() && s.need_state()
    }),
    BucketRule::new("brand.category_format", Bucket::Ka6, |s| {
        s.own_brand() && s.category_format()
    }),
    BucketRule::new("brand.support", Bucket::Ka7, |s| {
        s.own_brand() && s.support()
    }),
    BucketRule::new("brand.navigational", Bucket::Ka1, |s| s.own_brand()),
    BucketRule::new("competitor.need_state", Bucket::CompNs, |s| {
        s.competitor() && s.need_state()
    }),
    BucketRule::new("competitor.product", Bucket::Comp2, |s| {
        s.competitor() && (s.formulation() || s.category_format() || s.transactional() || s.howto())
    }),
    BucketRule::new("competitor.navigational", Bucket::Comp1, |s| s.competitor()),
    BucketRule::new("proprietary.non_brand", Bucket::Own1, |s| s.proprietary()),
    BucketRule::new("non_brand.trust", Bucket::Nb6, |s| s.trust()),
    BucketRule::new("non_brand.howto", Bucket::Nb5, |s| s.howto()),
    BucketRule::new("non_brand.formulation", Bucket::Nb1, |s| s.formulation()),
    BucketRule::new("non_brand.need_state", Bucket::Nb2, |s| s.need_state()),
    BucketRule::new("non_brand.category_format", Bucket::Nb4, |s| {
        s.category_format()
    }),
];

/// First rule in [`BUCKET_RULES`] that fires, if any.
pub fn matching_rule(signals: &SignalVector) -> Option<&'static BucketRule> {
    BUCKET_RULES.iter().find(|rule| rule.matches(signals))
}

/// Resolve exactly one bucket for a signal vector.
pub fn resolve_bucket(signals: &SignalVector) -> Bucket {
    matching_rule(signals)
        .map(|rule| rule.bucket)
        .unwrap_or(Bucket::Unclassified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenCategory::{self, *};
    use crate::policy::signals::PhraseSignals;

    fn signals(categories: &[TokenCategory]) -> SignalVector {
        SignalVector::from_categories(categories.iter().copied())
    }

    fn with_vs(categories: &[TokenCategory]) -> SignalVector {
        signals(categories).with_phrases(PhraseSignals {
            vs: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_rule_names_are_unique() {
        let mut names: Vec<&str> = BUCKET_RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BUCKET_RULES.len());
    }

    #[test]
    fn test_no_signals_is_unclassified() {
        assert_eq!(resolve_bucket(&SignalVector::default()), Bucket::Unclassified);
        assert!(matching_rule(&SignalVector::default()).is_none());
    }

    #[test]
    fn test_evaluation_branch() {
        assert_eq!(
            resolve_bucket(&with_vs(&[EvalTerms, KaTokens, ClassicalFormulations])),
            Bucket::Cmp2
        );
        assert_eq!(
            resolve_bucket(&with_vs(&[EvalTerms, CompetitorBrands, ClassicalFormulations])),
            Bucket::Cmp2
        );
        assert_eq!(resolve_bucket(&with_vs(&[EvalTerms, CompetitorBrands])), Bucket::Cmp1);
        assert_eq!(
            resolve_bucket(&with_vs(&[EvalTerms, ClassicalFormulations])),
            Bucket::Cmp3
        );
        // no comparison phrase: always CMP-3, even with brand and formulation
        assert_eq!(
            resolve_bucket(&signals(&[EvalTerms, KaTokens, ClassicalFormulations])),
            Bucket::Cmp3
        );
    }

    #[test]
    fn test_comparison_phrase_without_eval_is_ignored() {
        assert_eq!(resolve_bucket(&with_vs(&[KaTokens])), Bucket::Ka1);
    }

    #[test]
    fn test_eval_outranks_brand_not_fit() {
        assert_eq!(
            resolve_bucket(&signals(&[EvalTerms, KaTokens, CorporateTerms])),
            Bucket::Cmp3
        );
    }

    #[test]
    fn test_brand_priority_order() {
        let ladder: &[(&[TokenCategory], Bucket)] = &[
            (&[CorporateTerms, ServicesTerms, GeoOtherTerms], Bucket::KaNf2),
            (&[ServicesTerms, GeoOtherTerms, ProprietaryProducts], Bucket::KaNf1),
            (&[GeoOtherTerms, ProprietaryProducts], Bucket::KaNf3),
            (&[ProprietaryProducts, ClassicalFormulations], Bucket::Ka3),
            (&[ClassicalFormulations, NeedStates], Bucket::Ka4),
            (&[NeedStates, CategoriesFormats], Bucket::KaNs),
            (&[CategoriesFormats, SupportTerms], Bucket::Ka6),
            (&[SupportTerms], Bucket::Ka7),
            (&[], Bucket::Ka1),
        ];

        for (extra, expected) in ladder {
            let mut categories = vec![KaTokens];
            categories.extend_from_slice(extra);
            assert_eq!(resolve_bucket(&signals(&categories)), *expected, "{extra:?}");
        }
    }

    #[test]
    fn test_own_brand_beats_competitor() {
        assert_eq!(
            resolve_bucket(&signals(&[KaTokens, CompetitorBrands, NeedStates])),
            Bucket::KaNs
        );
    }

    #[test]
    fn test_competitor_branch() {
        assert_eq!(
            resolve_bucket(&signals(&[CompetitorBrands, NeedStates, TxnTerms])),
            Bucket::CompNs
        );
        for trigger in [ClassicalFormulations, CategoriesFormats, TxnTerms, HowtoTerms] {
            assert_eq!(
                resolve_bucket(&signals(&[CompetitorBrands, trigger])),
                Bucket::Comp2,
                "{trigger}"
            );
        }
        assert_eq!(
            resolve_bucket(&signals(&[CompetitorBrands, TrustTerms])),
            Bucket::Comp1
        );
        assert_eq!(
            resolve_bucket(&signals(&[CompetitorBrands, ProprietaryProducts])),
            Bucket::Comp1
        );
    }

    #[test]
    fn test_proprietary_non_brand() {
        assert_eq!(
            resolve_bucket(&signals(&[ProprietaryProducts, TrustTerms])),
            Bucket::Own1
        );
    }

    #[test]
    fn test_non_brand_priority_order() {
        assert_eq!(
            resolve_bucket(&signals(&[TrustTerms, HowtoTerms, ClassicalFormulations])),
            Bucket::Nb6
        );
        assert_eq!(
            resolve_bucket(&signals(&[HowtoTerms, ClassicalFormulations])),
            Bucket::Nb5
        );
        assert_eq!(
            resolve_bucket(&signals(&[ClassicalFormulations, NeedStates])),
            Bucket::Nb1
        );
        assert_eq!(
            resolve_bucket(&signals(&[NeedStates, CategoriesFormats])),
            Bucket::Nb2
        );
        assert_eq!(resolve_bucket(&signals(&[CategoriesFormats])), Bucket::Nb4);
        // support/services/txn alone do not place a non-brand keyword
        assert_eq!(
            resolve_bucket(&signals(&[SupportTerms, ServicesTerms, TxnTerms])),
            Bucket::Unclassified
        );
    }

    #[test]
    fn test_matching_rule_reports_name() {
        let rule = matching_rule(&signals(&[KaTokens, SupportTerms])).unwrap();
        assert_eq!(rule.name, "brand.support");
        assert_eq!(rule.bucket, Bucket::Ka7);
    }
}
