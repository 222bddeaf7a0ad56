//! Dump command implementation

use anyhow::Result;
use chrono::{DateTime, Utc};
use rtfm_core::{ResolvedEntry, SourceCache};
use serde::Serialize;

use super::table_error;
use crate::output::{OutputFormat, print_json, print_jsonl};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DumpReport<'a> {
    source: &'a str,
    project: &'a str,
    version: &'a str,
    built_at: DateTime<Utc>,
    total: usize,
    entries: &'a [ResolvedEntry],
}

/// Execute the dump command.
///
/// Entries come out in table order, which is inventory order.
pub async fn execute(
    cache: &SourceCache,
    source: &str,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let table = cache.get_or_build(source).await.map_err(table_error)?;

    let entries: Vec<ResolvedEntry> = table
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|(key, url)| ResolvedEntry {
            key: key.to_string(),
            url: url.to_string(),
        })
        .collect();

    match format {
        OutputFormat::Text => {
            for entry in &entries {
                println!("{}\t{}", entry.key, entry.url);
            }
        },
        OutputFormat::Json => print_json(&DumpReport {
            source,
            project: &table.project_name,
            version: &table.project_version,
            built_at: table.built_at,
            total: table.len(),
            entries: &entries,
        })?,
        OutputFormat::Jsonl => print_jsonl(&entries)?,
    }
    Ok(())
}
