//! Resolve free-text queries into documentation links.
//!
//! A lookup goes through these steps:
//!
//! 1. no query: answer with the source's base URL
//! 2. strip leading namespace qualifiers (`discord.ext.commands.` and friends)
//! 3. on primary sources, redirect bare interface member names such as `send`
//!    to `abc.Messageable.send`
//! 4. rank every key of the source's table and keep the best few

use std::collections::HashSet;
use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::cache::SourceCache;
use crate::config::{LookupConfig, MatcherKind, SourceConfig};
use crate::matcher::{SubsequenceMatcher, rank};
use crate::types::ResolvedEntry;
use crate::{Error, Result};

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Lookup {
    /// No query was given; this is the source's index page.
    Index {
        /// Documentation root of the source.
        url: String,
    },
    /// Matches, best first.
    Found {
        /// Ranked entries, never empty.
        entries: Vec<ResolvedEntry>,
    },
    /// The query matched nothing.
    NotFound,
}

/// Query rewriting rules, compiled once.
pub struct QueryRules {
    qualifier: Regex,
    interface: String,
    members: HashSet<String>,
}

impl QueryRules {
    /// Compile rules from `[lookup]` settings.
    pub fn from_config(config: &LookupConfig) -> Result<Self> {
        let qualifier = Regex::new(&config.query_qualifier)
            .map_err(|e| Error::Config(format!("Invalid lookup.query_qualifier: {e}")))?;

        Ok(Self {
            qualifier,
            interface: config.redirect.interface.clone(),
            members: config
                .redirect
                .members
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
        })
    }

    /// Rewrite a raw query into the form matched against keys.
    #[must_use]
    pub fn normalize(&self, source: &SourceConfig, raw: &str) -> String {
        let stripped = self
            .qualifier
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map_or(raw, |m| m.as_str());

        if source.primary {
            let lowered = stripped.to_lowercase();
            if self.members.contains(&lowered) {
                return format!("{}.{lowered}", self.interface);
            }
        }

        stripped.to_string()
    }
}

/// Answers lookups against a [`SourceCache`].
pub struct QueryResolver {
    cache: Arc<SourceCache>,
    rules: QueryRules,
    matcher: Box<dyn FuzzyMatcher + Send + Sync>,
    limit: usize,
}

impl QueryResolver {
    /// Resolver with the scorer and limit from `config`.
    pub fn new(cache: Arc<SourceCache>, config: &LookupConfig) -> Result<Self> {
        let matcher: Box<dyn FuzzyMatcher + Send + Sync> = match config.matcher {
            MatcherKind::Subsequence => Box::new(SubsequenceMatcher),
            MatcherKind::Skim => Box::new(SkimMatcherV2::default()),
        };

        Ok(Self {
            cache,
            rules: QueryRules::from_config(config)?,
            matcher,
            limit: config.max_results.max(1),
        })
    }

    /// Override the maximum number of matches.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// The cache this resolver reads from.
    #[must_use]
    pub const fn cache(&self) -> &Arc<SourceCache> {
        &self.cache
    }

    /// Documentation root for `source_key`.
    pub fn base_url(&self, source_key: &str) -> Result<&str> {
        self.cache
            .source(source_key)
            .map(|source| source.base_url.as_str())
    }

    /// Resolve `query` against `source_key`.
    ///
    /// An absent or blank query returns [`Lookup::Index`] without touching the
    /// cache. An empty ranking is [`Lookup::NotFound`], not an error.
    pub async fn resolve(&self, source_key: &str, query: Option<&str>) -> Result<Lookup> {
        let source = self.cache.source(source_key)?;

        let Some(raw) = query.map(str::trim).filter(|q| !q.is_empty()) else {
            return Ok(Lookup::Index {
                url: source.base_url.clone(),
            });
        };

        let query = self.rules.normalize(source, raw);
        let table = self.cache.get_or_build(source_key).await?;

        let entries: Vec<ResolvedEntry> = rank(self.matcher.as_ref(), &query, table.iter(), self.limit)
            .into_iter()
            .map(|hit| ResolvedEntry {
                key: hit.key.to_string(),
                url: hit.value.to_string(),
            })
            .collect();

        debug!(
            source = source_key,
            raw,
            query = %query,
            matches = entries.len(),
            "resolved lookup"
        );

        if entries.is_empty() {
            Ok(Lookup::NotFound)
        } else {
            Ok(Lookup::Found { entries })
        }
    }
}
