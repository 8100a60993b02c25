//! CLI entry point for the doi-engagement tool.

use anyhow::Result;

mod app;
mod app_config;
mod cli;
mod commands;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    app::runtime::run().await
}
