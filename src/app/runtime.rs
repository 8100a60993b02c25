//! Process run loop: parse, configure, open the database, dispatch.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;
use doi_engagement::{AppContext, Database};
use tracing::debug;

use crate::app::config_runtime::{Settings, resolve_settings};
use crate::app::progress_manager::BarProgress;
use crate::app::terminal;
use crate::app_config::load_file_config;
use crate::cli::{Cli, Command};
use crate::commands;

pub(crate) async fn run() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    let no_color = terminal::no_color_env_requested() || terminal::is_dumb_terminal();
    terminal::init_tracing(terminal::default_log_level(&cli), no_color);

    let loaded = load_file_config(cli.config.as_deref())?;
    if loaded.loaded_from_file {
        debug!(path = ?loaded.path, "Loaded config file");
    }
    let settings = resolve_settings(&cli, &loaded.config);
    debug!(?settings, "Resolved settings");

    let db = Database::new(&settings.database, &settings.db_options)
        .await
        .with_context(|| format!("Failed to open database {}", settings.database.display()))?;
    let ctx = AppContext::new(db);

    let result = dispatch(&cli, &settings, &ctx).await;
    ctx.close().await;
    result
}

async fn dispatch(cli: &Cli, settings: &Settings, ctx: &AppContext) -> Result<()> {
    let progress = BarProgress::new(terminal::should_use_progress_bar(
        std::io::stderr().is_terminal(),
        cli.quiet,
        terminal::is_dumb_terminal(),
    ));

    match &cli.command {
        Command::Import(args) => commands::run_import_command(ctx, args).await,
        Command::DeriveUrls(args) => {
            commands::run_derive_urls_command(ctx, settings, args, &progress).await
        }
        Command::LinkNcbi(args) => {
            commands::run_link_ncbi_command(ctx, settings, args, &progress).await
        }
        Command::FetchEngagement(args) => {
            commands::run_fetch_engagement_command(ctx, settings, args, &progress).await
        }
        Command::PurgeIdentifiers => commands::run_purge_identifiers_command(ctx).await,
        Command::PurgeUrls => commands::run_purge_urls_command(ctx).await,
        Command::Status => commands::run_status_command(ctx, settings).await,
    }
}
