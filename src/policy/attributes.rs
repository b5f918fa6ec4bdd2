//! Attributes derived from the resolved bucket and signals.

use crate::policy::signals::SignalVector;
use crate::policy::types::{Bucket, Intent, NegativeClassification, PaidActivation, SeoAsset};

/// Everything the policy derives after the bucket is fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedAttributes {
    pub intent: Intent,
    pub paid_activation: PaidActivation,
    pub seo_asset: SeoAsset,
    pub negative: NegativeClassification,
}

impl DerivedAttributes {
    /// Derive every attribute of a resolved bucket.
    ///
    /// A not-fit bucket forces [`PaidActivation::Exclude`] whatever the
    /// intent says.
    pub fn derive(bucket: Bucket, signals: &SignalVector) -> Self {
        let intent = derive_intent(bucket, signals);
        let negative = negative_classification(bucket);
        let paid_activation = if negative.is_negative {
            PaidActivation::Exclude
        } else {
            paid_activation(intent)
        };

        Self {
            intent,
            paid_activation,
            seo_asset: seo_asset(bucket),
            negative,
        }
    }
}

/// Presumed searcher intent, in priority order.
pub fn derive_intent(bucket: Bucket, signals: &SignalVector) -> Intent {
    if signals.transactional() {
        Intent::Txn
    } else if signals.eval() {
        Intent::Eval
    } else if matches!(bucket, Bucket::Ka1 | Bucket::Comp1)
        && !(signals.formulation() || signals.need_state() || signals.category_format())
    {
        Intent::Nav
    } else if signals.support() && signals.own_brand() {
        Intent::Support
    } else {
        // NB-5 and NB-6 land here as well
        Intent::Learn
    }
}

/// Paid activation suggested by intent alone.
pub fn paid_activation(intent: Intent) -> PaidActivation {
    match intent {
        Intent::Txn => PaidActivation::SearchShopping,
        Intent::Eval => PaidActivation::SearchTight,
        _ => PaidActivation::Exclude,
    }
}

/// Suggested SEO asset for a bucket.
pub fn seo_asset(bucket: Bucket) -> SeoAsset {
    match bucket {
        Bucket::Ka3 | Bucket::Ka4 | Bucket::Own1 | Bucket::Nb1 => SeoAsset::Pdp,
        Bucket::Ka6 | Bucket::Nb4 => SeoAsset::Plp,
        Bucket::Nb5 => SeoAsset::UsageFaq,
        Bucket::Cmp1 | Bucket::Cmp2 | Bucket::Cmp3 => SeoAsset::Comparison,
        Bucket::Ka7 => SeoAsset::Policy,
        b if b.is_not_fit() => SeoAsset::ReviewNeeded,
        _ => SeoAsset::HubGuide,
    }
}

/// Negative routing: only the `KA-NF*` buckets are negative.
pub fn negative_classification(bucket: Bucket) -> NegativeClassification {
    match bucket {
        Bucket::KaNf1 => NegativeClassification::route("Services"),
        Bucket::KaNf2 => NegativeClassification::route("Corporate/Investor"),
        Bucket::KaNf3 => NegativeClassification::route("Geo mismatch"),
        _ => NegativeClassification::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenCategory::{self, *};

    fn signals(categories: &[TokenCategory]) -> SignalVector {
        SignalVector::from_categories(categories.iter().copied())
    }

    #[test]
    fn test_intent_priority() {
        assert_eq!(
            derive_intent(Bucket::Cmp3, &signals(&[TxnTerms, EvalTerms])),
            Intent::Txn
        );
        assert_eq!(derive_intent(Bucket::Cmp3, &signals(&[EvalTerms])), Intent::Eval);
        assert_eq!(derive_intent(Bucket::Ka1, &signals(&[KaTokens])), Intent::Nav);
        assert_eq!(
            derive_intent(Bucket::Comp1, &signals(&[CompetitorBrands, TrustTerms])),
            Intent::Nav
        );
        assert_eq!(
            derive_intent(Bucket::Ka7, &signals(&[KaTokens, SupportTerms])),
            Intent::Support
        );
        assert_eq!(derive_intent(Bucket::Nb5, &signals(&[HowtoTerms])), Intent::Learn);
        assert_eq!(derive_intent(Bucket::Nb6, &signals(&[TrustTerms])), Intent::Learn);
    }

    #[test]
    fn test_nav_requires_no_content_signal() {
        assert_eq!(
            derive_intent(Bucket::Ka1, &signals(&[KaTokens, NeedStates])),
            Intent::Learn
        );
    }

    #[test]
    fn test_support_requires_own_brand() {
        assert_eq!(
            derive_intent(Bucket::Comp1, &signals(&[CompetitorBrands, SupportTerms])),
            Intent::Nav
        );
        assert_eq!(derive_intent(Bucket::Unclassified, &signals(&[SupportTerms])), Intent::Learn);
    }

    #[test]
    fn test_seo_asset_table() {
        assert_eq!(seo_asset(Bucket::Ka3), SeoAsset::Pdp);
        assert_eq!(seo_asset(Bucket::Own1), SeoAsset::Pdp);
        assert_eq!(seo_asset(Bucket::Nb4), SeoAsset::Plp);
        assert_eq!(seo_asset(Bucket::Nb5), SeoAsset::UsageFaq);
        assert_eq!(seo_asset(Bucket::Cmp2), SeoAsset::Comparison);
        assert_eq!(seo_asset(Bucket::Ka7), SeoAsset::Policy);
        assert_eq!(seo_asset(Bucket::KaNf3), SeoAsset::ReviewNeeded);
        assert_eq!(seo_asset(Bucket::Nb6), SeoAsset::HubGuide);
        assert_eq!(seo_asset(Bucket::CompNs), SeoAsset::HubGuide);
        assert_eq!(seo_asset(Bucket::Unclassified), SeoAsset::HubGuide);
    }

    #[test]
    fn test_not_fit_forces_exclude() {
        let derived = DerivedAttributes::derive(Bucket::KaNf1, &signals(&[KaTokens, ServicesTerms, TxnTerms]));
        assert_eq!(derived.intent, Intent::Txn);
        assert_eq!(derived.paid_activation, PaidActivation::Exclude);
        assert!(derived.negative.is_negative);
        assert_eq!(derived.negative.negative_type, "Route");
        assert_eq!(derived.negative.negative_theme, "Services");
    }

    #[test]
    fn test_negative_themes() {
        assert_eq!(negative_classification(Bucket::KaNf2).negative_theme, "Corporate/Investor");
        assert_eq!(negative_classification(Bucket::KaNf3).negative_theme, "Geo mismatch");
        assert_eq!(negative_classification(Bucket::Ka1), NegativeClassification::none());
    }

    #[test]
    fn test_paid_activation_by_intent() {
        assert_eq!(paid_activation(Intent::Txn), PaidActivation::SearchShopping);
        assert_eq!(paid_activation(Intent::Eval), PaidActivation::SearchTight);
        assert_eq!(paid_activation(Intent::Nav), PaidActivation::Exclude);
        assert_eq!(paid_activation(Intent::Support), PaidActivation::Exclude);
    }
}
