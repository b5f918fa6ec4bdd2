//! Taxonomy values produced by the classification policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KwcatError, Result};

/// A leaf of the marketing taxonomy, or the `UNCLASSIFIED` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bucket {
    #[serde(rename = "CMP-1")]
    Cmp1,
    #[serde(rename = "CMP-2")]
    Cmp2,
    #[serde(rename = "CMP-3")]
    Cmp3,
    #[serde(rename = "KA-NF1")]
    KaNf1,
    #[serde(rename = "KA-NF2")]
    KaNf2,
    #[serde(rename = "KA-NF3")]
    KaNf3,
    #[serde(rename = "KA-1")]
    Ka1,
    #[serde(rename = "KA-3")]
    Ka3,
    #[serde(rename = "KA-4")]
    Ka4,
    #[serde(rename = "KA-NS")]
    KaNs,
    #[serde(rename = "KA-6")]
    Ka6,
    #[serde(rename = "KA-7")]
    Ka7,
    #[serde(rename = "COMP-NS")]
    CompNs,
    #[serde(rename = "COMP-1")]
    Comp1,
    #[serde(rename = "COMP-2")]
    Comp2,
    #[serde(rename = "OWN-1")]
    Own1,
    #[serde(rename = "NB-1")]
    Nb1,
    #[serde(rename = "NB-2")]
    Nb2,
    #[serde(rename = "NB-4")]
    Nb4,
    #[serde(rename = "NB-5")]
    Nb5,
    #[serde(rename = "NB-6")]
    Nb6,
    #[serde(rename = "UNCLASSIFIED")]
    Unclassified,
}

impl Bucket {
    /// Every bucket the rule policy can emit, sentinel last.
    pub const ALL: [Bucket; 22] = [
        Bucket::Cmp1,
        Bucket::Cmp2,
        Bucket::Cmp3,
        Bucket::KaNf1,
        Bucket::KaNf2,
        Bucket::KaNf3,
        Bucket::Ka1,
        Bucket::Ka3,
        Bucket::Ka4,
        Bucket::KaNs,
        Bucket::Ka6,
        Bucket::Ka7,
        Bucket::CompNs,
        Bucket::Comp1,
        Bucket::Comp2,
        Bucket::Own1,
        Bucket::Nb1,
        Bucket::Nb2,
        Bucket::Nb4,
        Bucket::Nb5,
        Bucket::Nb6,
        Bucket::Unclassified,
    ];

    /// Taxonomy id of this bucket.
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Cmp1 => "CMP-1",
            Bucket::Cmp2 => "CMP-2",
            Bucket::Cmp3 => "CMP-3",
            Bucket::KaNf1 => "KA-NF1",
            Bucket::KaNf2 => "KA-NF2",
            Bucket::KaNf3 => "KA-NF3",
            Bucket::Ka1 => "KA-1",
            Bucket::Ka3 => "KA-3",
            Bucket::Ka4 => "KA-4",
            Bucket::KaNs => "KA-NS",
            Bucket::Ka6 => "KA-6",
            Bucket::Ka7 => "KA-7",
            Bucket::CompNs => "COMP-NS",
            Bucket::Comp1 => "COMP-1",
            Bucket::Comp2 => "COMP-2",
            Bucket::Own1 => "OWN-1",
            Bucket::Nb1 => "NB-1",
            Bucket::Nb2 => "NB-2",
            Bucket::Nb4 => "NB-4",
            Bucket::Nb5 => "NB-5",
            Bucket::Nb6 => "NB-6",
            Bucket::Unclassified => "UNCLASSIFIED",
        }
    }

    /// Brand keywords routed away from paid targeting (`KA-NF*`).
    pub fn is_not_fit(&self) -> bool {
        self.as_str().starts_with("KA-NF")
    }

    pub fn is_unclassified(&self) -> bool {
        matches!(self, Bucket::Unclassified)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = KwcatError;

    fn from_str(s: &str) -> Result<Self> {
        Bucket::ALL
            .iter()
            .copied()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| KwcatError::invalid_argument(format!("unknown bucket id: {s}")))
    }
}

/// The searcher's presumed goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    Learn,
    Txn,
    Eval,
    Nav,
    Support,
}

impl Intent {
    /// Every intent, in taxonomy order.
    pub const ALL: [Intent; 5] = [
        Intent::Learn,
        Intent::Txn,
        Intent::Eval,
        Intent::Nav,
        Intent::Support,
    ];

    /// Taxonomy label, e.g. `"TXN"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Learn => "LEARN",
            Intent::Txn => "TXN",
            Intent::Eval => "EVAL",
            Intent::Nav => "NAV",
            Intent::Support => "SUPPORT",
        }
    }

    /// Funnel stage implied by this intent. Fixed lookup, total.
    pub fn stage(&self) -> Stage {
        match self {
            Intent::Txn => Stage::Bof,
            Intent::Eval => Stage::Mof,
            Intent::Support => Stage::Ret,
            Intent::Nav => Stage::Tof,
            Intent::Learn => Stage::Tof,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Funnel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stage {
    Tof,
    Mof,
    Bof,
    Ret,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Tof, Stage::Mof, Stage::Bof, Stage::Ret];

    /// Taxonomy label, e.g. `"MOF"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Tof => "TOF",
            Stage::Mof => "MOF",
            Stage::Bof => "BOF",
            Stage::Ret => "RET",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suggested paid-media treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaidActivation {
    #[serde(rename = "Search/Shopping")]
    SearchShopping,
    #[serde(rename = "Search (tight)")]
    SearchTight,
    #[serde(rename = "Exclude")]
    Exclude,
}

impl PaidActivation {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaidActivation::SearchShopping => "Search/Shopping",
            PaidActivation::SearchTight => "Search (tight)",
            PaidActivation::Exclude => "Exclude",
        }
    }
}

impl fmt::Display for PaidActivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suggested SEO landing asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeoAsset {
    #[serde(rename = "PDP")]
    Pdp,
    #[serde(rename = "PLP")]
    Plp,
    #[serde(rename = "Usage/FAQ")]
    UsageFaq,
    #[serde(rename = "Comparison")]
    Comparison,
    #[serde(rename = "Policy")]
    Policy,
    #[serde(rename = "Review needed")]
    ReviewNeeded,
    #[serde(rename = "Hub/Guide")]
    HubGuide,
}

impl SeoAsset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeoAsset::Pdp => "PDP",
            SeoAsset::Plp => "PLP",
            SeoAsset::UsageFaq => "Usage/FAQ",
            SeoAsset::Comparison => "Comparison",
            SeoAsset::Policy => "Policy",
            SeoAsset::ReviewNeeded => "Review needed",
            SeoAsset::HubGuide => "Hub/Guide",
        }
    }
}

impl fmt::Display for SeoAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Negative-keyword flag with its type and theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegativeClassification {
    #[serde(with = "yes_no")]
    pub is_negative: bool,
    pub negative_type: String,
    pub negative_theme: String,
}

impl NegativeClassification {
    /// Not a negative keyword.
    pub fn none() -> Self {
        Self {
            is_negative: false,
            negative_type: "None".to_string(),
            negative_theme: "None".to_string(),
        }
    }

    /// A negative that routes the keyword away from paid targeting.
    pub fn route<S: Into<String>>(theme: S) -> Self {
        Self {
            is_negative: true,
            negative_type: "Route".to_string(),
            negative_theme: theme.into(),
        }
    }

    /// `"Y"` or `"N"`.
    pub fn flag(&self) -> &'static str {
        if self.is_negative { "Y" } else { "N" }
    }
}

/// The result of classifying one keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub bucket: Bucket,
    pub intent: Intent,
    pub stage: Stage,
    pub paid_activation: PaidActivation,
    pub seo_asset: SeoAsset,
    #[serde(flatten)]
    pub negative: NegativeClassification,
    pub confidence: f64,
    pub notes: String,
}

mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Y" } else { "N" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match String::deserialize(deserializer)?.as_str() {
            "Y" => Ok(true),
            "N" => Ok(false),
            other => Err(D::Error::custom(format!("expected Y or N, got {other}"))),
        }
    }
}
