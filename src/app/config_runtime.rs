//! Merges CLI flags over file configuration into runtime settings.

use std::path::PathBuf;

use doi_engagement::engagement::{DEFAULT_GRAPH_API_VERSION, DEFAULT_GRAPH_BASE_URL};
use doi_engagement::resolve::DEFAULT_NCBI_TOOL;
use doi_engagement::{DatabaseOptions, HttpTimeouts};

use crate::app_config::FileConfig;
use crate::cli::Cli;

/// Database file used when neither flag nor config names one.
pub(crate) const DEFAULT_DATABASE_PATH: &str = "engagement.db";

/// Effective settings for one invocation.
#[derive(Clone)]
pub(crate) struct Settings {
    pub(crate) database: PathBuf,
    pub(crate) db_options: DatabaseOptions,
    pub(crate) timeouts: HttpTimeouts,
    pub(crate) graph_access_token: Option<String>,
    pub(crate) graph_api_version: String,
    pub(crate) graph_base_url: String,
    pub(crate) ncbi_tool: String,
    pub(crate) ncbi_email: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("database", &self.database)
            .field("db_options", &self.db_options)
            .field("timeouts", &self.timeouts)
            .field(
                "graph_access_token",
                &self.graph_access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("graph_api_version", &self.graph_api_version)
            .field("graph_base_url", &self.graph_base_url)
            .field("ncbi_tool", &self.ncbi_tool)
            .field("ncbi_email", &self.ncbi_email)
            .finish()
    }
}

pub(crate) fn resolve_settings(cli: &Cli, file: &FileConfig) -> Settings {
    let defaults = DatabaseOptions::default();
    let default_timeouts = HttpTimeouts::default();

    Settings {
        database: cli
            .database
            .clone()
            .or_else(|| file.database.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
        db_options: DatabaseOptions {
            max_connections: file.db_max_connections.unwrap_or(defaults.max_connections),
            busy_timeout_ms: file.db_busy_timeout_ms.unwrap_or(defaults.busy_timeout_ms),
        },
        timeouts: HttpTimeouts {
            connect_secs: file
                .connect_timeout_secs
                .unwrap_or(default_timeouts.connect_secs),
            read_secs: file.read_timeout_secs.unwrap_or(default_timeouts.read_secs),
        },
        graph_access_token: file.graph_access_token.clone(),
        graph_api_version: file
            .graph_api_version
            .clone()
            .unwrap_or_else(|| DEFAULT_GRAPH_API_VERSION.to_string()),
        graph_base_url: file
            .graph_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.to_string()),
        ncbi_tool: file
            .ncbi_tool
            .clone()
            .unwrap_or_else(|| DEFAULT_NCBI_TOOL.to_string()),
        ncbi_email: file.ncbi_email.clone().unwrap_or_default(),
    }
}
