//! URL derivation steps: resolver URLs, landing pages and NCBI cross references.

use tracing::{info, instrument, warn};

use crate::resolve::{CrossReferenceResolver, LandingPageResolver, derive_static_variants};
use crate::store::{Identifier, StoreError, UrlVariant};

use super::context::AppContext;
use super::progress::Progress;
use super::summary::{CrossReferenceSummary, DeriveSummary, ItemFailure, VariantTally};

fn record_outcomes(
    variants: &mut VariantTally,
    rows: &[(String, UrlVariant)],
    outcomes: &[crate::store::AddOutcome],
) {
    for ((_, variant), outcome) in rows.iter().zip(outcomes) {
        variants.entry(*variant).or_default().record(outcome);
    }
}

/// Derives resolver and landing-page URLs for every stored identifier.
///
/// Both resolver URLs are always computed. The landing page is resolved over
/// the network only when the identifier has none stored yet, or when `force`
/// is set. An identifier's rows commit together; a failed landing-page lookup
/// is reported and the identifier's resolver URLs are still stored.
///
/// # Errors
///
/// Returns [`StoreError`] when the store itself fails; per-identifier network
/// failures land in [`DeriveSummary::failures`] instead.
#[instrument(skip(ctx, resolver, progress))]
pub async fn derive_urls(
    ctx: &AppContext,
    resolver: &LandingPageResolver,
    force: bool,
    progress: &dyn Progress,
) -> Result<DeriveSummary, StoreError> {
    let identifiers = ctx.identifiers.list_all().await?;
    let mut summary = DeriveSummary {
        identifiers: identifiers.len(),
        ..DeriveSummary::default()
    };

    progress.start("derive-urls", identifiers.len() as u64);
    for identifier in &identifiers {
        derive_for_identifier(ctx, resolver, force, identifier, &mut summary).await?;
        progress.advance(&identifier.doi);
    }
    progress.finish();

    info!(
        identifiers = summary.identifiers,
        landing_pages_skipped = summary.landing_pages_skipped,
        failures = summary.failures.len(),
        "URL derivation finished"
    );
    Ok(summary)
}

async fn derive_for_identifier(
    ctx: &AppContext,
    resolver: &LandingPageResolver,
    force: bool,
    identifier: &Identifier,
    summary: &mut DeriveSummary,
) -> Result<(), StoreError> {
    let mut rows = Vec::from(derive_static_variants(&identifier.doi));

    if !force
        && ctx
            .urls
            .has_variant(identifier.id, UrlVariant::LandingPage)
            .await?
    {
        summary.landing_pages_skipped += 1;
    } else {
        match resolver.resolve_landing_page(&identifier.doi).await {
            Ok(landing) => rows.push((landing, UrlVariant::LandingPage)),
            Err(error) => {
                warn!(doi = %identifier.doi, error = %error, "Landing page resolution failed");
                summary.failures.push(ItemFailure::new(&identifier.doi, &error));
            }
        }
    }

    let outcomes = ctx.urls.add_all_if_absent(identifier.id, &rows).await?;
    record_outcomes(&mut summary.variants, &rows, &outcomes);
    Ok(())
}

/// Adds PubMed and PMC URLs for every stored identifier.
///
/// Identifiers that already own a PubMed or PMC URL are skipped unless
/// `force` is set. One ID converter request is made per remaining identifier.
///
/// # Errors
///
/// Returns [`StoreError`] when the store itself fails; per-identifier lookup
/// failures land in [`CrossReferenceSummary::failures`] instead.
#[instrument(skip(ctx, resolver, progress))]
pub async fn link_cross_references(
    ctx: &AppContext,
    resolver: &CrossReferenceResolver,
    force: bool,
    progress: &dyn Progress,
) -> Result<CrossReferenceSummary, StoreError> {
    let identifiers = ctx.identifiers.list_all().await?;
    let mut summary = CrossReferenceSummary {
        identifiers: identifiers.len(),
        ..CrossReferenceSummary::default()
    };

    progress.start("link-ncbi", identifiers.len() as u64);
    for identifier in &identifiers {
        link_identifier(ctx, resolver, force, identifier, &mut summary).await?;
        progress.advance(&identifier.doi);
    }
    progress.finish();

    info!(
        identifiers = summary.identifiers,
        already_linked = summary.already_linked,
        no_match = summary.no_match,
        failures = summary.failures.len(),
        "Cross-reference linking finished"
    );
    Ok(summary)
}

async fn link_identifier(
    ctx: &AppContext,
    resolver: &CrossReferenceResolver,
    force: bool,
    identifier: &Identifier,
    summary: &mut CrossReferenceSummary,
) -> Result<(), StoreError> {
    if !force {
        let has_pubmed = ctx.urls.has_variant(identifier.id, UrlVariant::Pubmed).await?;
        let has_pmc = ctx
            .urls
            .has_variant(identifier.id, UrlVariant::PubmedCentral)
            .await?;
        if has_pubmed || has_pmc {
            summary.already_linked += 1;
            return Ok(());
        }
    }

    let reference = match resolver.lookup(&identifier.doi).await {
        Ok(reference) => reference,
        Err(error) => {
            warn!(doi = %identifier.doi, error = %error, "Cross-reference lookup failed");
            summary.failures.push(ItemFailure::new(&identifier.doi, &error));
            return Ok(());
        }
    };

    if reference.is_empty() {
        summary.no_match += 1;
        return Ok(());
    }

    let rows = reference.urls();
    let outcomes = ctx.urls.add_all_if_absent(identifier.id, &rows).await?;
    record_outcomes(&mut summary.variants, &rows, &outcomes);
    Ok(())
}
