//! Command implementations.

pub mod dump;
pub mod lookup;
pub mod refresh;
pub mod sources;

use anyhow::anyhow;
use tracing::warn;

/// Shown when a source's lookup table cannot be fetched or decoded.
pub const BUILD_FAILED_MESSAGE: &str = "Cannot build lookup table, try again later.";

/// Shown when a query matches nothing.
pub const NOT_FOUND_MESSAGE: &str = "Could not find anything. Sorry.";

/// Convert a core error into the message users see.
///
/// Fetch and decode failures collapse into [`BUILD_FAILED_MESSAGE`]; the
/// underlying cause is logged.
pub fn table_error(err: rtfm_core::Error) -> anyhow::Error {
    if err.is_build_failure() || err.is_recoverable() {
        warn!(category = err.category(), error = %err, "lookup table unavailable");
        anyhow!(BUILD_FAILED_MESSAGE)
    } else {
        err.into()
    }
}
