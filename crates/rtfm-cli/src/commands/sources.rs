//! Sources command implementation

use anyhow::Result;
use colored::Colorize;
use rtfm_core::SourceConfig;
use serde::Serialize;

use crate::output::{OutputFormat, print_json, print_jsonl};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceLine<'a> {
    key: &'a str,
    base_url: &'a str,
    primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> From<&'a SourceConfig> for SourceLine<'a> {
    fn from(source: &'a SourceConfig) -> Self {
        Self {
            key: &source.key,
            base_url: &source.base_url,
            primary: source.primary,
            description: source.description.as_deref(),
        }
    }
}

/// Execute the sources command.
pub fn execute(sources: &[SourceConfig], format: OutputFormat) -> Result<()> {
    let lines: Vec<SourceLine<'_>> = sources.iter().map(SourceLine::from).collect();

    match format {
        OutputFormat::Text => {
            if lines.is_empty() {
                println!("No sources configured");
                return Ok(());
            }
            let width = lines.iter().map(|l| l.key.chars().count()).max().unwrap_or(0);
            for line in &lines {
                let marker = if line.primary { "*" } else { " " };
                println!(
                    "{marker} {}  {}  {}",
                    format!("{:<width$}", line.key).green(),
                    line.base_url,
                    line.description.unwrap_or_default().bright_black()
                );
            }
        },
        OutputFormat::Json => print_json(&lines)?,
        OutputFormat::Jsonl => print_jsonl(&lines)?,
    }
    Ok(())
}
