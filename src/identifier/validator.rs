//! DOI syntax validation against a fixed, ordered set of known forms.

use std::sync::LazyLock;

use regex::Regex;

/// Compiles a regex at static init; panics on invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Known DOI syntactic forms, checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoiPattern {
    /// Modern generic prefix/suffix form (covers the vast majority of DOIs).
    Generic,
    /// Wiley `10.1002/...`, whose suffixes may contain almost anything.
    Wiley,
    /// ISO serial item and contribution identifiers embedded in the suffix.
    SerialItem,
    /// American Chemical Society abstract-style suffixes.
    ChemicalAbstract,
    /// Legacy Taylor & Francis (Erlbaum) suffixes with `&` issue markers.
    LegacyIssue,
}

impl DoiPattern {
    /// Returns the stable label used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Wiley => "wiley",
            Self::SerialItem => "serial_item",
            Self::ChemicalAbstract => "chemical_abstract",
            Self::LegacyIssue => "legacy_issue",
        }
    }
}

static PATTERNS: LazyLock<Vec<(DoiPattern, Regex)>> = LazyLock::new(|| {
    vec![
        (
            DoiPattern::Generic,
            compile_static_regex(r"(?i)^10\.\d{4,9}/[-._;()/:A-Z0-9]+$"),
        ),
        (DoiPattern::Wiley, compile_static_regex(r"(?i)^10\.1002/\S+$")),
        (
            DoiPattern::SerialItem,
            compile_static_regex(
                r"(?i)^10\.\d{4}/\d+-\d+X?(\d+)\d+<[\d\w]+:[\d\w]*>\d+.\d+.\w+;\d$",
            ),
        ),
        (
            DoiPattern::ChemicalAbstract,
            compile_static_regex(r"(?i)^10\.1021/\w\w\d+$"),
        ),
        (
            DoiPattern::LegacyIssue,
            compile_static_regex(r"(?i)^10\.1207/[\w\d]+&\d+_\d+$"),
        ),
    ]
});

/// Returns `true` when `raw` matches any known DOI form (case-insensitive).
///
/// Malformed input is never an error; it simply fails validation.
///
/// # Examples
///
/// ```
/// use doi_engagement::identifier::validate;
///
/// assert!(validate("10.1000/xyz123"));
/// assert!(!validate("not a doi"));
/// ```
#[must_use]
pub fn validate(raw: &str) -> bool {
    PATTERNS.iter().any(|(_, regex)| regex.is_match(raw))
}

/// Returns every pattern `raw` matches, in check order.
#[must_use]
pub fn matching_patterns(raw: &str) -> Vec<DoiPattern> {
    PATTERNS
        .iter()
        .filter(|(_, regex)| regex.is_match(raw))
        .map(|(pattern, _)| *pattern)
        .collect()
}
