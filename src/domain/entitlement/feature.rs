//! Capability identifiers gated by tier.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// A capability that some tiers grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureFlag {
    /// Upload blood test results as PDF.
    PdfUpload,
    AdvancedInsights,
    PrioritySupport,
    /// Yearly health baseline assessment.
    AnnualAssessment,
    PersonalizedPlans,
    ExpertConsult,
    PremiumMarketplace,
}

impl FeatureFlag {
    pub const ALL: [FeatureFlag; 7] = [
        FeatureFlag::PdfUpload,
        FeatureFlag::AdvancedInsights,
        FeatureFlag::PrioritySupport,
        FeatureFlag::AnnualAssessment,
        FeatureFlag::PersonalizedPlans,
        FeatureFlag::ExpertConsult,
        FeatureFlag::PremiumMarketplace,
    ];

    /// Snake-case identifier, also used as the upsell feature name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureFlag::PdfUpload => "pdf_upload",
            FeatureFlag::AdvancedInsights => "advanced_insights",
            FeatureFlag::PrioritySupport => "priority_support",
            FeatureFlag::AnnualAssessment => "annual_assessment",
            FeatureFlag::PersonalizedPlans => "personalized_plans",
            FeatureFlag::ExpertConsult => "expert_consult",
            FeatureFlag::PremiumMarketplace => "premium_marketplace",
        }
    }

    /// Human-readable label for upsell copy.
    pub fn display_name(&self) -> &'static str {
        match self {
            FeatureFlag::PdfUpload => "PDF upload",
            FeatureFlag::AdvancedInsights => "Advanced insights",
            FeatureFlag::PrioritySupport => "Priority support",
            FeatureFlag::AnnualAssessment => "Annual health assessment",
            FeatureFlag::PersonalizedPlans => "Personalized wellness plans",
            FeatureFlag::ExpertConsult => "Expert consultations",
            FeatureFlag::PremiumMarketplace => "Premium marketplace",
        }
    }
}

impl std::fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeatureFlag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureFlag::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s)
            .ok_or_else(|| ValidationError::unknown_value("feature_flag", s))
    }
}
