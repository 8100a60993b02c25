//! Per-run counters returned by pipeline steps.

use std::collections::BTreeMap;
use std::fmt;

use crate::store::{AddOutcome, UrlVariant};

/// Added vs already-present counts for one URL variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariantCounts {
    pub added: usize,
    pub already_present: usize,
}

impl VariantCounts {
    /// Counts one insert-if-absent outcome.
    pub fn record(&mut self, outcome: &AddOutcome) {
        if outcome.created {
            self.added += 1;
        } else {
            self.already_present += 1;
        }
    }
}

/// Per-variant counters keyed in variant order.
pub type VariantTally = BTreeMap<UrlVariant, VariantCounts>;

fn tally(variants: &VariantTally, variant: UrlVariant) -> VariantCounts {
    variants.get(&variant).copied().unwrap_or_default()
}

/// One item that could not be processed; the run continued past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// DOI or URL the failure is about.
    pub item: String,
    /// Rendered error.
    pub reason: String,
}

impl ItemFailure {
    pub fn new(item: impl Into<String>, reason: &impl fmt::Display) -> Self {
        Self {
            item: item.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result of `derive_urls`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeriveSummary {
    /// Identifiers visited.
    pub identifiers: usize,
    /// Identifiers whose landing page was already stored and not re-resolved.
    pub landing_pages_skipped: usize,
    pub variants: VariantTally,
    /// Landing-page lookups that failed.
    pub failures: Vec<ItemFailure>,
}

impl DeriveSummary {
    #[must_use]
    pub fn counts(&self, variant: UrlVariant) -> VariantCounts {
        tally(&self.variants, variant)
    }
}

/// Result of `link_cross_references`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossReferenceSummary {
    /// Identifiers visited.
    pub identifiers: usize,
    /// Identifiers skipped because a PubMed or PMC URL already existed.
    pub already_linked: usize,
    /// Lookups that succeeded but found no PubMed or PMC id.
    pub no_match: usize,
    pub variants: VariantTally,
    pub failures: Vec<ItemFailure>,
}

impl CrossReferenceSummary {
    #[must_use]
    pub fn counts(&self, variant: UrlVariant) -> VariantCounts {
        tally(&self.variants, variant)
    }
}

/// Result of `capture_engagement`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngagementSummary {
    /// URLs a fetch was attempted for.
    pub requested: usize,
    /// Snapshots appended.
    pub snapshots_recorded: usize,
    /// Listed URLs with no stored row; these were not fetched.
    pub unknown: Vec<String>,
    pub failures: Vec<ItemFailure>,
}

/// Row counts across the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub import_batches: i64,
    pub identifiers: i64,
    pub urls: i64,
    pub snapshots: i64,
}
