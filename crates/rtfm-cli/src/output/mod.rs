//! # Output Formatting
//!
//! Every command renders through one of three formats:
//!
//! - **Text**: human-readable output with colors
//! - **JSON**: a single pretty-printed JSON value
//! - **JSONL**: one compact JSON object per line
//!
//! Text is the default on a terminal; piped output defaults to JSON (see
//! [`crate::utils::cli_args::FormatArg`]).

use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;

/// Output format options supported by the CLI
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty text output (default on a terminal)
    Text,
    /// Single JSON document
    Json,
    /// Newline-delimited JSON
    #[value(alias = "ndjson")]
    Jsonl,
}

impl OutputFormat {
    /// Whether the format is meant for other programs.
    pub const fn is_machine(self) -> bool {
        matches!(self, Self::Json | Self::Jsonl)
    }
}

/// Write `value` as one pretty-printed JSON document.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Write each item as one compact JSON line.
pub fn print_jsonl<'a, T, I>(items: I) -> Result<()>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut out = io::stdout().lock();
    for item in items {
        serde_json::to_writer(&mut out, item)?;
        writeln!(out)?;
    }
    Ok(())
}
