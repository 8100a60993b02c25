//! User-Agent string shared by every outbound HTTP client.

/// Identifies the tool to resolvers, NCBI and the graph API.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("doi-engagement/{version} (research-tool; engagement-snapshots)")
}
