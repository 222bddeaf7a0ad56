//! rtfm CLI - fuzzy lookup of Sphinx documentation links
//!
//! Parses arguments, loads configuration, wires the core cache and resolver
//! together, and dispatches to the command implementations.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use rtfm_core::{Config, HttpFetcher, QueryResolver, SourceCache};
use tracing::debug;

mod cli;
mod commands;
mod output;
mod utils;

use crate::cli::{Cli, Commands};
use crate::utils::initialize_logging;

/// Execute the rtfm CLI with the currently configured environment.
///
/// # Errors
///
/// Returns an error if configuration loading or command execution fails.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    execute_command(cli).await
}

async fn execute_command(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = load_config(cli.config.as_deref())?;

    match command {
        Commands::Lookup {
            source,
            query,
            limit,
            format,
        } => {
            let mut resolver = build_resolver(&config)?;
            if let Some(limit) = limit {
                resolver = resolver.with_limit(usize::from(limit));
            }
            commands::lookup::execute(&resolver, &source, &query, format.resolve()).await
        },
        Commands::Refresh {
            sources,
            all,
            format,
        } => {
            let cache = build_cache(&config)?;
            commands::refresh::execute(&cache, &sources, all, format.resolve(), cli.quiet).await
        },
        Commands::Sources { format } => commands::sources::execute(&config.sources, format.resolve()),
        Commands::Dump {
            source,
            limit,
            format,
        } => {
            let cache = build_cache(&config)?;
            commands::dump::execute(&cache, &source, limit, format.resolve()).await
        },
    }
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    debug!(sources = config.sources.len(), "configuration loaded");
    Ok(config)
}

fn build_cache(config: &Config) -> Result<Arc<SourceCache>> {
    let fetcher = HttpFetcher::with_timeout(Duration::from_secs(config.fetch.timeout_secs))?;
    Ok(Arc::new(SourceCache::new(
        config.sources.clone(),
        Arc::new(fetcher),
        config.normalize_rules(),
        config.lookup.chunk_size,
    )))
}

fn build_resolver(config: &Config) -> Result<QueryResolver> {
    Ok(QueryResolver::new(build_cache(config)?, &config.lookup)?)
}
