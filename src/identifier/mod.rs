//! Identifier intake: DOI syntax validation and import payload parsing.
//!
//! - [`validate`] - pattern-OR DOI syntax check
//! - [`parse_candidates`] - delimited `(doi, url)` payload reader
//! - [`ImportError`] - payload-level failures that abort an import

mod import;
mod validator;

pub use import::{Candidate, ImportError, parse_candidates};
pub use validator::{DoiPattern, matching_patterns, validate};
