//! rtfm CLI - fuzzy lookup of Sphinx documentation links
//!
//! This is the main entry point for the rtfm command-line interface.
//! Command implementations live in the library crate.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rtfm_cli::run().await
}
