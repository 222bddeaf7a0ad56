//! Refresh command implementation

use std::sync::Arc;

use anyhow::{Result, bail};
use colored::Colorize;
use rtfm_core::{InventorySource, SourceCache};
use serde::Serialize;

use super::BUILD_FAILED_MESSAGE;
use crate::output::{OutputFormat, print_json, print_jsonl};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshReport {
    source: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl RefreshReport {
    fn new(source: String, outcome: &rtfm_core::Result<Arc<InventorySource>>) -> Self {
        match outcome {
            Ok(table) => Self {
                source,
                ok: true,
                project: Some(table.project_name.clone()),
                version: Some(table.project_version.clone()),
                entries: Some(table.len()),
                error: None,
            },
            Err(err) => Self {
                source,
                ok: false,
                project: None,
                version: None,
                entries: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Execute the refresh command.
///
/// Every requested source is rebuilt even when an earlier one fails. The
/// command fails if any source did.
pub async fn execute(
    cache: &SourceCache,
    sources: &[String],
    all: bool,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let outcomes = if all {
        cache.refresh_all().await
    } else {
        for key in sources {
            cache.source(key)?;
        }
        let mut outcomes = Vec::with_capacity(sources.len());
        for key in sources {
            outcomes.push((key.clone(), cache.refresh(key).await));
        }
        outcomes
    };

    let reports: Vec<RefreshReport> = outcomes
        .iter()
        .map(|(key, outcome)| RefreshReport::new(key.clone(), outcome))
        .collect();

    match format {
        OutputFormat::Text => print_text(&reports, quiet),
        OutputFormat::Json => print_json(&reports)?,
        OutputFormat::Jsonl => print_jsonl(&reports)?,
    }

    let failed = reports.iter().filter(|r| !r.ok).count();
    if failed > 0 {
        bail!("{failed} of {} sources failed to refresh", reports.len());
    }
    Ok(())
}

fn print_text(reports: &[RefreshReport], quiet: bool) {
    let width = reports
        .iter()
        .map(|r| r.source.chars().count())
        .max()
        .unwrap_or(0);

    for report in reports {
        let name = format!("{:<width$}", report.source);
        if report.ok {
            if quiet {
                continue;
            }
            println!(
                "{} {}  {} {} ({} entries)",
                "✓".green(),
                name.green(),
                report.project.as_deref().unwrap_or_default(),
                report.version.as_deref().unwrap_or_default(),
                report.entries.unwrap_or_default()
            );
        } else {
            eprintln!(
                "{} {}  {} ({})",
                "✗".red(),
                name.red(),
                BUILD_FAILED_MESSAGE,
                report.error.as_deref().unwrap_or_default().bright_black()
            );
        }
    }
}
