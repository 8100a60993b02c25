//! CLI summary formatting.
//!
//! Renderers return lines so they can be tested; `print_lines` writes them
//! to stdout.

use doi_engagement::ImportSummary;
use doi_engagement::UrlVariant;
use doi_engagement::pipeline::{
    CrossReferenceSummary, DeriveSummary, EngagementSummary, ItemFailure, StatusReport,
    VariantTally,
};

pub(crate) fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn variant_lines(variants: &VariantTally, order: &[UrlVariant]) -> Vec<String> {
    order
        .iter()
        .map(|variant| {
            let counts = variants.get(variant).copied().unwrap_or_default();
            format!(
                "  {:<16} added {:>5}   already present {:>5}",
                variant.as_str(),
                counts.added,
                counts.already_present
            )
        })
        .collect()
}

fn failure_lines(failures: &[ItemFailure]) -> Vec<String> {
    if failures.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("Failed ({}):", failures.len())];
    lines.extend(
        failures
            .iter()
            .map(|failure| format!("  {}: {}", failure.item, first_line(&failure.reason))),
    );
    lines
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

pub(crate) fn render_import_summary(source: &str, summary: &ImportSummary) -> Vec<String> {
    vec![
        format!("Imported {source} (batch {})", summary.batch_id),
        format!(
            "  identifiers      added {:>5}   already present {:>5}",
            summary.identifiers_added, summary.identifiers_already_present
        ),
        format!(
            "  urls             added {:>5}   already present {:>5}",
            summary.urls_added, summary.urls_already_present
        ),
        format!("  rejected         {:>5}", summary.rejected),
    ]
}

pub(crate) fn render_derive_summary(summary: &DeriveSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Derived URLs for {} identifier(s); {} landing page(s) already known",
        summary.identifiers, summary.landing_pages_skipped
    )];
    lines.extend(variant_lines(
        &summary.variants,
        &[UrlVariant::DoiNew, UrlVariant::DoiOld, UrlVariant::LandingPage],
    ));
    lines.extend(failure_lines(&summary.failures));
    lines
}

pub(crate) fn render_cross_reference_summary(summary: &CrossReferenceSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Linked {} identifier(s); {} already linked, {} without PubMed record",
        summary.identifiers, summary.already_linked, summary.no_match
    )];
    lines.extend(variant_lines(
        &summary.variants,
        &[UrlVariant::Pubmed, UrlVariant::PubmedCentral],
    ));
    lines.extend(failure_lines(&summary.failures));
    lines
}

pub(crate) fn render_engagement_summary(summary: &EngagementSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Recorded {} snapshot(s) for {} URL(s)",
        summary.snapshots_recorded, summary.requested
    )];
    if !summary.unknown.is_empty() {
        lines.push(format!("Unknown URLs ({}):", summary.unknown.len()));
        lines.extend(summary.unknown.iter().map(|url| format!("  {url}")));
    }
    lines.extend(failure_lines(&summary.failures));
    lines
}

pub(crate) fn render_status(database: &str, report: &StatusReport) -> Vec<String> {
    vec![
        format!("Database: {database}"),
        format!("  import batches   {:>7}", report.import_batches),
        format!("  identifiers      {:>7}", report.identifiers),
        format!("  urls             {:>7}", report.urls),
        format!("  snapshots        {:>7}", report.snapshots),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use doi_engagement::pipeline::VariantCounts;

    #[test]
    fn test_render_import_summary_lists_all_counters() {
        let summary = ImportSummary {
            batch_id: 4,
            identifiers_added: 2,
            identifiers_already_present: 1,
            urls_added: 1,
            urls_already_present: 0,
            rejected: 3,
        };
        let lines = render_import_summary("dois.csv", &summary);
        assert_eq!(lines[0], "Imported dois.csv (batch 4)");
        assert!(lines[1].contains("added     2"));
        assert!(lines[3].contains('3'));
    }

    #[test]
    fn test_render_derive_summary_shows_variants_and_failures() {
        let mut summary = DeriveSummary {
            identifiers: 1,
            ..DeriveSummary::default()
        };
        summary.variants.insert(
            UrlVariant::DoiNew,
            VariantCounts {
                added: 1,
                already_present: 0,
            },
        );
        summary.failures.push(ItemFailure {
            item: "10.1000/xyz123".to_string(),
            reason: "network resolution failed\n  Suggestion: retry".to_string(),
        });

        let lines = render_derive_summary(&summary);
        assert!(lines.iter().any(|l| l.contains("doi_new") && l.contains("added     1")));
        assert!(lines.iter().any(|l| l.contains("landing_page")));
        assert!(lines.contains(&"Failed (1):".to_string()));
        assert!(lines.contains(&"  10.1000/xyz123: network resolution failed".to_string()));
    }

    #[test]
    fn test_render_engagement_summary_lists_unknown_urls() {
        let summary = EngagementSummary {
            requested: 1,
            snapshots_recorded: 1,
            unknown: vec!["https://unknown.example/".to_string()],
            failures: Vec::new(),
        };
        let lines = render_engagement_summary(&summary);
        assert_eq!(lines[0], "Recorded 1 snapshot(s) for 1 URL(s)");
        assert!(lines.contains(&"  https://unknown.example/".to_string()));
    }

    #[test]
    fn test_render_status() {
        let lines = render_status(
            "engagement.db",
            &StatusReport {
                import_batches: 1,
                identifiers: 2,
                urls: 6,
                snapshots: 12,
            },
        );
        assert_eq!(lines.len(), 5);
        assert!(lines[4].ends_with("12"));
    }
}
