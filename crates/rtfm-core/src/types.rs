use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Compression scheme announced by the fourth header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// No recognised compression marker.
    None,
    /// Body is a zlib stream.
    Zlib,
}

impl Compression {
    /// Classify a raw marker line. Anything mentioning zlib counts.
    #[must_use]
    pub fn from_marker(line: &str) -> Self {
        if line.contains("zlib") {
            Self::Zlib
        } else {
            Self::None
        }
    }
}

/// The four plain-text lines that precede the compressed body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryHeader {
    pub format_version: String,
    pub project_name: String,
    pub project_version: String,
    pub compression: Compression,
}

/// One decoded inventory line, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub name: String,
    pub domain: String,
    pub subdirective: String,
    pub priority: i64,
    pub location: String,
    pub display_name: String,
}

impl InventoryRecord {
    /// `domain:subdirective`, as it appears on the wire.
    #[must_use]
    pub fn directive(&self) -> String {
        format!("{}:{}", self.domain, self.subdirective)
    }
}

impl fmt::Display for InventoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{} {} {} {}",
            self.name,
            self.domain,
            self.subdirective,
            self.priority,
            self.location,
            self.display_name
        )
    }
}

/// A normalized lookup key and the absolute URL it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    pub key: String,
    pub url: String,
}

/// A fully parsed inventory for one documentation source.
///
/// Built in one pass and never mutated afterwards; a refresh replaces the
/// whole value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySource {
    pub source_key: String,
    pub base_url: String,
    pub project_name: String,
    pub project_version: String,
    pub built_at: DateTime<Utc>,
    /// Lookup key to URL, in parse order.
    pub entries: IndexMap<String, String>,
}

impl InventorySource {
    /// Number of distinct lookup keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the inventory produced no usable entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact key lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Iterate `(key, url)` pairs in parse order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
