//! Turning decoded inventory lines into lookup keys.
//!
//! Parsing is split in two so each half can be tested alone:
//!
//! - [`parse_record`] tokenizes one line into an [`InventoryRecord`]
//! - [`InventoryParser`] applies the normalization rules and builds the
//!   key → URL table for a source
//!
//! Normalization, applied per record in order:
//!
//! 1. a `py:module` record whose name is already present is dropped (Sphinx
//!    1.1 and older emitted two entries per module and the first is correct)
//! 2. `std:doc` records are filed under `label`
//! 3. a location ending in `$` expands to the record name
//! 4. the display name is the key unless it is `-`
//! 5. `std` records get a `<role>:` prefix
//! 6. the project's own namespaces are stripped from its own inventory
//! 7. the location is joined onto the source base URL

use std::sync::LazyLock;

use chrono::Utc;
use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use crate::codec;
use crate::types::{InventoryRecord, InventorySource};
use crate::Result;

/// `name  domain:role  priority  location  display name`
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static RECORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+(\S*:\S*)\s+(-?\d+)\s+(\S+)\s+(.*)$").unwrap());

/// Tokenize one decoded line.
///
/// Returns `None` for blank or malformed lines; inventories routinely end
/// with noise and those lines are skipped rather than reported.
#[must_use]
pub fn parse_record(line: &str) -> Option<InventoryRecord> {
    let caps = RECORD_RE.captures(line.trim_end())?;

    let (domain, subdirective) = caps[2].split_once(':')?;
    // The pattern only admits `-?\d+`, so a failed parse is an overflow.
    let priority = caps[3].parse::<i64>().unwrap_or_else(|_| {
        if caps[3].starts_with('-') { i64::MIN } else { i64::MAX }
    });

    Some(InventoryRecord {
        name: caps[1].to_string(),
        domain: domain.to_string(),
        subdirective: subdirective.to_string(),
        priority,
        location: caps[4].to_string(),
        display_name: caps[5].to_string(),
    })
}

/// Join a relative inventory location onto a base URL with exactly one slash.
#[must_use]
pub fn join_url(base: &str, location: &str) -> String {
    let location = location.trim_start_matches('/');
    if base.ends_with('/') {
        format!("{base}{location}")
    } else {
        format!("{base}/{location}")
    }
}

/// Project-specific key cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeRules {
    self_project: Option<String>,
    namespace_prefixes: Vec<String>,
}

impl NormalizeRules {
    /// Strip `namespace_prefixes` from keys, but only in the inventory whose
    /// project name is `self_project`.
    #[must_use]
    pub fn new(self_project: impl Into<String>, namespace_prefixes: &[String]) -> Self {
        let mut prefixes: Vec<String> = namespace_prefixes
            .iter()
            .filter(|p| !p.is_empty())
            .cloned()
            .collect();
        // longest first so "discord.ext.commands." wins over "discord."
        prefixes.sort_by(|a, b| b.len().cmp(&a.len()));

        Self {
            self_project: Some(self_project.into()),
            namespace_prefixes: prefixes,
        }
    }

    fn strips_namespaces_for(&self, project_name: &str) -> bool {
        self.self_project.as_deref() == Some(project_name)
    }
}

/// Builds the lookup table for one documentation source.
pub struct InventoryParser<'r> {
    base_url: &'r str,
    rules: &'r NormalizeRules,
}

impl<'r> InventoryParser<'r> {
    /// Parser resolving locations against `base_url`.
    #[must_use]
    pub const fn new(base_url: &'r str, rules: &'r NormalizeRules) -> Self {
        Self { base_url, rules }
    }

    /// Consume decoded lines and produce the ordered key → URL table.
    ///
    /// Decoder errors abort the parse; malformed lines are skipped.
    pub fn parse<I>(&self, project_name: &str, lines: I) -> Result<IndexMap<String, String>>
    where
        I: IntoIterator<Item = Result<String>>,
    {
        let strip = self.rules.strips_namespaces_for(project_name);
        let mut entries = IndexMap::new();
        let mut skipped = 0usize;

        for line in lines {
            let line = line?;
            let Some(record) = parse_record(&line) else {
                if !line.trim().is_empty() {
                    skipped += 1;
                }
                continue;
            };

            if let Some((key, url)) = self.normalize(record, strip, &entries) {
                entries.insert(key, url);
            }
        }

        debug!(
            project = project_name,
            entries = entries.len(),
            skipped,
            "parsed inventory"
        );
        Ok(entries)
    }

    /// Apply the normalization rules to a single record.
    ///
    /// Returns `None` when the record must be dropped.
    pub fn normalize(
        &self,
        record: InventoryRecord,
        strip_namespaces: bool,
        existing: &IndexMap<String, String>,
    ) -> Option<(String, String)> {
        let InventoryRecord {
            name,
            domain,
            mut subdirective,
            location,
            display_name,
            ..
        } = record;

        let is_module = domain == "py" && subdirective == "module";
        if is_module && existing.contains_key(&name) {
            return None;
        }

        if domain == "std" && subdirective == "doc" {
            subdirective = "label".to_string();
        }

        let location = match location.strip_suffix('$') {
            Some(stem) => format!("{stem}{name}"),
            None => location,
        };

        let mut key = if display_name == "-" {
            name
        } else {
            display_name
        };

        if strip_namespaces {
            for prefix in &self.rules.namespace_prefixes {
                key = key.replace(prefix.as_str(), "");
            }
        }

        let key = if domain == "std" {
            format!("{subdirective}:{key}")
        } else {
            key
        };

        Some((key, join_url(self.base_url, &location)))
    }
}

/// Decode a fetched `objects.inv` buffer into a complete [`InventorySource`].
pub fn build_source(
    source_key: &str,
    base_url: &str,
    bytes: &[u8],
    rules: &NormalizeRules,
    chunk_size: usize,
) -> Result<InventorySource> {
    let (header, lines) = codec::decode(bytes, chunk_size)?;
    let entries = InventoryParser::new(base_url, rules).parse(&header.project_name, lines)?;

    Ok(InventorySource {
        source_key: source_key.to_string(),
        base_url: base_url.to_string(),
        project_name: header.project_name,
        project_version: header.project_version,
        built_at: Utc::now(),
        entries,
    })
}
