//! Command handlers for the `doi-engagement` CLI.

mod derive;
mod fetch;
mod import;
mod purge;
mod status;

pub(crate) use derive::{run_derive_urls_command, run_link_ncbi_command};
pub(crate) use fetch::run_fetch_engagement_command;
pub(crate) use import::run_import_command;
pub(crate) use purge::{run_purge_identifiers_command, run_purge_urls_command};
pub(crate) use status::run_status_command;
