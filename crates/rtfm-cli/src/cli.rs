//! # CLI Structure and Argument Parsing
//!
//! The CLI follows a standard command-subcommand pattern:
//!
//! - **Global options**: apply to all commands (`--verbose`, `--quiet`,
//!   `--no-color`, `--config`)
//! - **Subcommands**: `lookup`, `refresh`, `sources`, `dump`
//!
//! ## Usage Patterns
//!
//! ```bash
//! # Best matches in the default source
//! rtfm lookup on_msg
//!
//! # Another source, JSON output
//! rtfm lookup -s python asyncio.gather --format json
//!
//! # Documentation root of a source
//! rtfm lookup -s python
//!
//! # Fetch every inventory and report what was loaded
//! rtfm refresh --all
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::cli_args::FormatArg;

/// Main CLI structure for the `rtfm` command
#[derive(Parser, Clone, Debug)]
#[command(name = "rtfm")]
#[command(version)]
#[command(about = "rtfm - fuzzy lookup of Sphinx documentation links", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to a configuration file
    #[arg(long, global = true, env = "RTFM_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Find documentation entries matching a query
    #[command(visible_alias = "rtfd")]
    Lookup {
        /// Source to search
        #[arg(short = 's', long, default_value = "latest")]
        source: String,

        /// Query terms; omit to print the source's documentation root
        #[arg(value_name = "QUERY")]
        query: Vec<String>,

        /// Maximum number of matches
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u16).range(1..))]
        limit: Option<u16>,

        #[command(flatten)]
        format: FormatArg,
    },

    /// Fetch inventories now and report what was loaded
    Refresh {
        /// Sources to refresh
        #[arg(value_name = "SOURCE", required_unless_present = "all")]
        sources: Vec<String>,

        /// Refresh every configured source
        #[arg(long, conflicts_with = "sources")]
        all: bool,

        #[command(flatten)]
        format: FormatArg,
    },

    /// List configured documentation sources
    #[command(visible_alias = "list")]
    Sources {
        #[command(flatten)]
        format: FormatArg,
    },

    /// Print the normalized lookup table of a source
    Dump {
        /// Source to dump
        source: String,

        /// Stop after this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        #[command(flatten)]
        format: FormatArg,
    },
}

impl Commands {
    /// The output format argument of this command.
    pub fn format(&self) -> &FormatArg {
        match self {
            Self::Lookup { format, .. }
            | Self::Refresh { format, .. }
            | Self::Sources { format }
            | Self::Dump { format, .. } => format,
        }
    }
}
