//! # rtfm-core
//!
//! Core functionality for rtfm - fuzzy documentation lookup over Sphinx
//! `objects.inv` inventories.
//!
//! ## Architecture
//!
//! - **Codec**: header parsing and chunked zlib decoding of inventory files
//! - **Inventory**: record tokenizing and key normalization
//! - **Cache**: per-source lookup tables, built once and refreshed atomically
//! - **Matcher**: subsequence fuzzy ranking of keys
//! - **Resolver**: query rewriting and ranked lookups
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use rtfm_core::{Config, HttpFetcher, Lookup, QueryResolver, SourceCache};
//!
//! # async fn demo() -> rtfm_core::Result<()> {
//! let config = Config::load()?;
//! let fetcher = HttpFetcher::with_timeout(Duration::from_secs(config.fetch.timeout_secs))?;
//! let cache = SourceCache::new(
//!     config.sources.clone(),
//!     Arc::new(fetcher),
//!     config.normalize_rules(),
//!     config.lookup.chunk_size,
//! );
//! let resolver = QueryResolver::new(Arc::new(cache), &config.lookup)?;
//!
//! match resolver.resolve("latest", Some("on_msg")).await? {
//!     Lookup::Found { entries } => {
//!         for entry in entries {
//!             println!("{} -> {}", entry.key, entry.url);
//!         }
//!     },
//!     Lookup::NotFound => println!("Could not find anything. Sorry."),
//!     Lookup::Index { url } => println!("{url}"),
//! }
//! # Ok(())
//! # }
//! ```

/// Per-source cache of parsed inventories
pub mod cache;
/// Reading and writing the `objects.inv` wire format
pub mod codec;
/// Configuration for sources and lookup behavior
pub mod config;
/// Error types and result aliases
pub mod error;
/// HTTP fetching of inventory files
pub mod fetcher;
/// Record tokenizing and key normalization
pub mod inventory;
/// Fuzzy ranking of lookup keys
pub mod matcher;
/// Query normalization and ranked lookups
pub mod resolver;
/// Core data types
pub mod types;

// Re-export commonly used types
pub use cache::SourceCache;
pub use codec::{CompressedLines, InventoryReader, decode, encode_inventory};
pub use config::{Config, FetchConfig, LookupConfig, MatcherKind, RedirectConfig, SourceConfig};
pub use error::{Error, Result};
pub use fetcher::{HttpFetcher, InventoryFetch, inventory_url};
pub use inventory::{InventoryParser, NormalizeRules, build_source, parse_record};
pub use matcher::{DEFAULT_LIMIT, SubsequenceMatcher, rank};
pub use resolver::{Lookup, QueryResolver, QueryRules};
pub use types::*;
