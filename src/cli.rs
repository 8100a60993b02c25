//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Track social engagement for scholarly articles by DOI.
///
/// Imports DOIs, derives the URLs each article circulates under, and records
/// engagement snapshots for those URLs over time.
#[derive(Parser, Debug)]
#[command(name = "doi-engagement")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/doi-engagement/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file (default: engagement.db)
    #[arg(short = 'd', long, value_name = "PATH", global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import DOIs (and optional URLs) from a delimited file with a header row
    Import(ImportArgs),
    /// Derive resolver and landing-page URLs for every stored DOI
    DeriveUrls(ForceArgs),
    /// Add PubMed and PubMed Central URLs via the NCBI ID converter
    LinkNcbi(ForceArgs),
    /// Capture engagement counters for stored URLs
    FetchEngagement(FetchArgs),
    /// Delete every identifier with its URLs and snapshots
    PurgeIdentifiers,
    /// Delete every URL with its snapshots
    PurgeUrls,
    /// Show row counts
    Status,
}

/// Arguments for `import`.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Delimited file with a `doi` column and an optional `url` column
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Field delimiter (single ASCII character, or `tab`)
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,
}

/// Arguments shared by derivation commands.
#[derive(Args, Debug)]
pub struct ForceArgs {
    /// Re-run network lookups even for identifiers that already have results
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `fetch-engagement`.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// JSON array of URLs to fetch (default: every stored URL)
    #[arg(long, value_name = "FILE")]
    pub urls: Option<PathBuf>,

    /// Graph API access token
    #[arg(long, env = "GRAPH_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Graph API version (e.g. v2.12)
    #[arg(long)]
    pub api_version: Option<String>,
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c as u8),
                _ => Err(format!(
                    "invalid delimiter '{value}': expected a single ASCII character or 'tab'"
                )),
            }
        }
    }
}
