//! Resolver URLs computed from the DOI string alone.

use crate::store::UrlVariant;

/// HTTPS resolver base.
pub const DOI_RESOLVER_BASE: &str = "https://doi.org";

/// Legacy HTTP resolver base.
pub const LEGACY_DOI_RESOLVER_BASE: &str = "http://dx.doi.org";

/// Percent-encodes a DOI for use as a single path segment.
///
/// Every reserved character is encoded, including `/`, so the resolver sees
/// the whole DOI as one segment.
#[must_use]
pub fn encode_doi(doi: &str) -> String {
    urlencoding::encode(doi).into_owned()
}

/// Returns the two resolver URLs for `doi`, HTTPS form first.
///
/// Pure; no network access.
#[must_use]
pub fn derive_static_variants(doi: &str) -> [(String, UrlVariant); 2] {
    let encoded = encode_doi(doi);
    [
        (format!("{DOI_RESOLVER_BASE}/{encoded}"), UrlVariant::DoiNew),
        (
            format!("{LEGACY_DOI_RESOLVER_BASE}/{encoded}"),
            UrlVariant::DoiOld,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_static_variants_encodes_slash() {
        let [(new, new_variant), (old, old_variant)] = derive_static_variants("10.1000/xyz123");
        assert_eq!(new, "https://doi.org/10.1000%2Fxyz123");
        assert_eq!(new_variant, UrlVariant::DoiNew);
        assert_eq!(old, "http://dx.doi.org/10.1000%2Fxyz123");
        assert_eq!(old_variant, UrlVariant::DoiOld);
    }

    #[test]
    fn test_encode_doi_escapes_reserved_characters() {
        assert_eq!(
            encode_doi("10.1002/(SICI)1097-4571"),
            "10.1002%2F%28SICI%291097-4571"
        );
        assert_eq!(encode_doi("10.1207/a&b_1"), "10.1207%2Fa%26b_1");
    }

    #[test]
    fn test_derive_static_variants_is_deterministic() {
        assert_eq!(
            derive_static_variants("10.1021/ja00123"),
            derive_static_variants("10.1021/ja00123")
        );
    }
}
