//! Derivation of additional URLs for stored identifiers.
//!
//! - [`derive_static_variants`] - resolver URLs computed from the DOI string
//! - [`LandingPageResolver`] - follows resolver redirects to the publisher page
//! - [`CrossReferenceResolver`] - PubMed / PMC ids from the NCBI ID converter
//!
//! Nothing here writes to the store; the pipeline persists what these return.

mod derive;
mod error;
mod landing;
mod ncbi;

pub use derive::{DOI_RESOLVER_BASE, LEGACY_DOI_RESOLVER_BASE, derive_static_variants, encode_doi};
pub use error::ResolveError;
pub use landing::LandingPageResolver;
pub use ncbi::{
    CrossReference, CrossReferenceReport, CrossReferenceResolver, DEFAULT_IDCONV_ENDPOINT,
    DEFAULT_NCBI_TOOL, pmc_url, pubmed_url,
};
