//! Lookup command implementation

use anyhow::Result;
use colored::Colorize;
use rtfm_core::{Lookup, QueryResolver};
use serde::Serialize;

use super::{NOT_FOUND_MESSAGE, table_error};
use crate::output::{OutputFormat, print_json, print_jsonl};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupReport<'a> {
    source: &'a str,
    query: Option<&'a str>,
    #[serde(flatten)]
    result: &'a Lookup,
}

#[derive(Serialize)]
struct EntryLine<'a> {
    source: &'a str,
    key: &'a str,
    url: &'a str,
}

/// Execute the lookup command.
pub async fn execute(
    resolver: &QueryResolver,
    source: &str,
    terms: &[String],
    format: OutputFormat,
) -> Result<()> {
    let joined = terms.join(" ");
    let query = Some(joined.trim()).filter(|q| !q.is_empty());

    let result = resolver.resolve(source, query).await.map_err(table_error)?;

    let report = LookupReport {
        source,
        query,
        result: &result,
    };

    match format {
        OutputFormat::Text => print_text(&result),
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Jsonl => match &result {
            Lookup::Found { entries } => {
                let lines: Vec<EntryLine<'_>> = entries
                    .iter()
                    .map(|entry| EntryLine {
                        source,
                        key: &entry.key,
                        url: &entry.url,
                    })
                    .collect();
                print_jsonl(&lines)?;
            },
            Lookup::Index { .. } | Lookup::NotFound => print_jsonl([&report])?,
        },
    }
    Ok(())
}

fn print_text(result: &Lookup) {
    match result {
        Lookup::Index { url } => println!("{url}"),
        Lookup::NotFound => println!("{NOT_FOUND_MESSAGE}"),
        Lookup::Found { entries } => {
            let width = entries
                .iter()
                .map(|entry| entry.key.chars().count())
                .max()
                .unwrap_or(0);
            for entry in entries {
                println!(
                    "{}  {}",
                    format!("{:<width$}", entry.key).green(),
                    entry.url.bright_black()
                );
            }
        },
    }
}
