//! Tier catalog - the single table of what each tier grants.
//!
//! | Tier | Wearables | Flags |
//! |------|-----------|-------|
//! | Free | 1 | none |
//! | Connect | Unlimited | pdf_upload, advanced_insights, priority_support |
//! | Baseline | Unlimited | Connect + annual_assessment, personalized_plans, expert_consult, premium_marketplace |
//!
//! A catalog is checked for monotonicity once, when it is built. No tier may
//! grant fewer entitlements than a lower tier.

use once_cell::sync::Lazy;
use thiserror::Error;

use super::{ConnectionLimit, FeatureFlag, Tier, TierLimits};

static STANDARD: Lazy<TierCatalog> = Lazy::new(|| {
    TierCatalog::new(standard_entries()).expect("built-in tier catalog must be monotonic")
});

fn standard_entries() -> Vec<TierLimits> {
    let connect_flags = [
        FeatureFlag::PdfUpload,
        FeatureFlag::AdvancedInsights,
        FeatureFlag::PrioritySupport,
    ];
    let baseline_flags = [
        FeatureFlag::AnnualAssessment,
        FeatureFlag::PersonalizedPlans,
        FeatureFlag::ExpertConsult,
        FeatureFlag::PremiumMarketplace,
    ];

    vec![
        TierLimits::new(Tier::Free, ConnectionLimit::Bounded(1), []),
        TierLimits::new(Tier::Connect, ConnectionLimit::Unbounded, connect_flags),
        TierLimits::new(
            Tier::Baseline,
            ConnectionLimit::Unbounded,
            connect_flags.into_iter().chain(baseline_flags),
        ),
    ]
}

/// Errors raised while building a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("tier catalog has no entry for {0}")]
    MissingTier(Tier),

    #[error("tier catalog has more than one entry for {0}")]
    DuplicateTier(Tier),

    #[error("{higher} grants fewer entitlements than {lower}")]
    NotMonotonic { lower: Tier, higher: Tier },
}

/// Immutable, verified mapping from tier to limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierCatalog {
    entries: [TierLimits; 3],
}

impl TierCatalog {
    /// Build a catalog from one entry per tier, verifying monotonicity.
    pub fn new(entries: Vec<TierLimits>) -> Result<Self, CatalogError> {
        let mut slots: [Option<TierLimits>; 3] = [None, None, None];
        for limits in entries {
            let slot = &mut slots[limits.tier.rank()];
            if slot.is_some() {
                return Err(CatalogError::DuplicateTier(limits.tier));
            }
            *slot = Some(limits);
        }

        let [free, connect, baseline] = slots;
        let entries = [
            free.ok_or(CatalogError::MissingTier(Tier::Free))?,
            connect.ok_or(CatalogError::MissingTier(Tier::Connect))?,
            baseline.ok_or(CatalogError::MissingTier(Tier::Baseline))?,
        ];

        // Superset and >= are transitive, adjacent pairs are enough.
        for pair in entries.windows(2) {
            if !pair[1].covers(&pair[0]) {
                return Err(CatalogError::NotMonotonic {
                    lower: pair[0].tier,
                    higher: pair[1].tier,
                });
            }
        }

        Ok(Self { entries })
    }

    /// The process-wide built-in catalog.
    pub fn standard() -> &'static TierCatalog {
        &STANDARD
    }

    /// Limits for `tier`. Total over every tier.
    pub fn limits_for(&self, tier: Tier) -> &TierLimits {
        &self.entries[tier.rank()]
    }

    /// All entries, lowest tier first.
    pub fn iter(&self) -> impl Iterator<Item = &TierLimits> {
        self.entries.iter()
    }

    /// Lowest tier that grants `flag`, if any does.
    pub fn lowest_tier_with_feature(&self, flag: FeatureFlag) -> Option<Tier> {
        self.iter()
            .find(|limits| limits.includes(flag))
            .map(|limits| limits.tier)
    }

    /// Lowest tier whose wearable limit exceeds `connected`.
    pub fn lowest_tier_admitting(&self, connected: u32) -> Option<Tier> {
        self.iter()
            .find(|limits| limits.can_connect_device(connected))
            .map(|limits| limits.tier)
    }
}
