use std::path::PathBuf;
use std::sync::Arc;

use kwcat::config::{Taxonomy, TokenLists};
use kwcat::error::Result;
use kwcat::policy::{
    BUCKET_RULES, Bucket, Intent, KeywordClassifier, PaidActivation, SeoAsset, Stage,
    classify_keyword,
};

fn config_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("config")
        .join(name)
}

fn sample_classifier() -> Result<KeywordClassifier> {
    let lists = TokenLists::load(config_path("lists.yaml"))?;
    Ok(KeywordClassifier::new(Arc::new(lists)))
}

#[test]
fn brand_comparison_is_cmp1() -> Result<()> {
    let classifier = sample_classifier()?;
    let result = classifier.classify("Kerala Ayurveda vs Himalaya");

    assert_eq!(result.bucket, Bucket::Cmp1);
    assert_eq!(result.intent, Intent::Eval);
    assert_eq!(result.stage, Stage::Mof);
    assert_eq!(result.paid_activation, PaidActivation::SearchTight);
    assert_eq!(result.seo_asset, SeoAsset::Comparison);
    assert!(!result.negative.is_negative);
    assert_eq!(result.confidence, 0.85);
    assert_eq!(result.notes, "");
    Ok(())
}

#[test]
fn brand_careers_is_routed_negative() -> Result<()> {
    let classifier = sample_classifier()?;
    let result = classifier.classify("kerala ayurveda careers");

    assert_eq!(result.bucket, Bucket::KaNf2);
    assert!(result.negative.is_negative);
    assert_eq!(result.negative.negative_type, "Route");
    assert_eq!(result.negative.negative_theme, "Corporate/Investor");
    assert_eq!(result.paid_activation, PaidActivation::Exclude);
    assert_eq!(result.seo_asset, SeoAsset::ReviewNeeded);
    Ok(())
}

#[test]
fn services_outrank_geo_for_brand() -> Result<()> {
    let classifier = sample_classifier()?;
    let result = classifier.classify("Kerala Ayurveda clinic in Texas");

    assert_eq!(result.bucket, Bucket::KaNf1);
    assert_eq!(result.negative.negative_theme, "Services");
    Ok(())
}

#[test]
fn ambiguous_howto_is_capped() -> Result<()> {
    let classifier = sample_classifier()?;
    let result = classifier.classify("triphala churna benefits");

    // howto outranks formulation for non-brand keywords
    assert_eq!(result.bucket, Bucket::Nb5);
    assert_eq!(result.intent, Intent::Learn);
    assert_eq!(result.seo_asset, SeoAsset::UsageFaq);
    assert_eq!(result.confidence, 0.55);
    assert_eq!(result.notes, "Multi-signal ambiguity");
    Ok(())
}

#[test]
fn transactional_formulation_is_nb1() -> Result<()> {
    let classifier = sample_classifier()?;
    let result = classifier.classify("buy ashwagandha capsules online");

    assert_eq!(result.bucket, Bucket::Nb1);
    assert_eq!(result.intent, Intent::Txn);
    assert_eq!(result.stage, Stage::Bof);
    assert_eq!(result.paid_activation, PaidActivation::SearchShopping);
    assert_eq!(result.seo_asset, SeoAsset::Pdp);
    assert_eq!(result.confidence, 0.85);
    Ok(())
}

#[test]
fn competitor_need_state() -> Result<()> {
    let classifier = sample_classifier()?;
    assert_eq!(
        classifier.classify("himalaya ashwagandha for sleep").bucket,
        Bucket::CompNs
    );
    Ok(())
}

#[test]
fn trust_question_is_nb6() -> Result<()> {
    let classifier = sample_classifier()?;
    let result = classifier.classify("is chyawanprash safe");
    assert_eq!(result.bucket, Bucket::Nb6);
    assert_eq!(result.seo_asset, SeoAsset::HubGuide);
    Ok(())
}

#[test]
fn unmatched_keyword_is_unclassified() -> Result<()> {
    let classifier = sample_classifier()?;
    let result = classifier.classify("random words here");

    assert_eq!(result.bucket, Bucket::Unclassified);
    assert_eq!(result.intent, Intent::Learn);
    assert_eq!(result.stage, Stage::Tof);
    assert_eq!(result.paid_activation, PaidActivation::Exclude);
    assert_eq!(result.confidence, 0.2);
    assert_eq!(result.notes, "Unclassified by rules");
    Ok(())
}

#[test]
fn classification_ignores_case_and_spacing() -> Result<()> {
    let classifier = sample_classifier()?;
    assert_eq!(
        classifier.classify("  KERALA   ayurveda\tVS himalaya "),
        classifier.classify("kerala ayurveda vs himalaya")
    );
    Ok(())
}

#[test]
fn free_function_matches_classifier() -> Result<()> {
    let lists = TokenLists::load(config_path("lists.yaml"))?;
    let classifier = KeywordClassifier::new(Arc::new(lists.clone()));
    for keyword in ["dabur chyawanprash price", "kerala ayurveda refund", "panchakarma"] {
        assert_eq!(classify_keyword(keyword, &lists), classifier.classify(keyword));
    }
    Ok(())
}

#[test]
fn sample_taxonomy_covers_every_rule_bucket() -> Result<()> {
    let taxonomy = Taxonomy::load(config_path("taxonomy.yaml"))?;
    for rule in BUCKET_RULES {
        assert!(
            taxonomy.contains_bucket(rule.bucket.as_str()),
            "{} emits {}",
            rule.name,
            rule.bucket
        );
    }
    Ok(())
}
