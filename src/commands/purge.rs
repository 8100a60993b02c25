//! `purge-identifiers` and `purge-urls` commands.

use anyhow::Result;
use doi_engagement::AppContext;
use tracing::warn;

pub(crate) async fn run_purge_identifiers_command(ctx: &AppContext) -> Result<()> {
    let removed = ctx.identifiers.purge_all().await?;
    warn!(removed, "Purged identifiers with their URLs and snapshots");
    println!("Removed {removed} identifier(s)");
    Ok(())
}

pub(crate) async fn run_purge_urls_command(ctx: &AppContext) -> Result<()> {
    let removed = ctx.urls.purge_all().await?;
    warn!(removed, "Purged URLs with their snapshots");
    println!("Removed {removed} URL(s)");
    Ok(())
}
