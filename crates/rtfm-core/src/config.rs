//! Configuration for documentation sources and lookup behavior.
//!
//! Configuration is stored in TOML. Missing sections fall back to defaults,
//! so an empty file (or no file at all) yields the stock set of sources.
//!
//! ## File Location
//!
//! 1. `$RTFM_CONFIG_DIR/config.toml` when the variable is set
//! 2. the platform config directory (`~/.config/rtfm/config.toml` on Linux)
//!
//! ## Example Configuration File
//!
//! ```toml
//! [lookup]
//! max_results = 8
//! matcher = "subsequence"
//!
//! [fetch]
//! timeout_secs = 30
//!
//! [[sources]]
//! key = "latest"
//! base_url = "https://discordpy.readthedocs.io/en/latest"
//! primary = true
//!
//! [[sources]]
//! key = "python"
//! base_url = "https://docs.python.org/3"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::codec::DEFAULT_CHUNK_SIZE;
use crate::inventory::NormalizeRules;
use crate::matcher::DEFAULT_LIMIT;
use crate::{Error, Result};

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "RTFM_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How queries are normalized and ranked
    pub lookup: LookupConfig,
    /// HTTP transport settings
    pub fetch: FetchConfig,
    /// Documentation sources, in display order
    pub sources: Vec<SourceConfig>,
}

/// Query normalization and ranking settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Maximum number of matches returned per query.
    pub max_results: usize,

    /// Compressed bytes inflated per step while decoding an inventory.
    pub chunk_size: usize,

    /// Scoring algorithm used to rank keys.
    pub matcher: MatcherKind,

    /// Project name whose inventory gets `namespace_prefixes` stripped.
    pub self_project: String,

    /// Namespaces removed from keys of the `self_project` inventory.
    pub namespace_prefixes: Vec<String>,

    /// Regex whose first capture group is the part of a query kept for matching.
    ///
    /// Used to drop qualifiers like `discord.ext.commands.` that users type
    /// but the stripped keys no longer carry.
    pub query_qualifier: String,

    /// Member names redirected onto a fully qualified interface path.
    pub redirect: RedirectConfig,
}

/// Scoring algorithm used by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    /// In-order subsequence, preferring tight and early matches.
    #[default]
    Subsequence,
    /// The skim v2 scorer from `fuzzy-matcher`.
    Skim,
}

/// Rewrites bare member names of a well-known interface.
///
/// On primary sources a query exactly equal (case-insensitively) to one of
/// `members` is rewritten to `<interface>.<member>` before matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Qualified interface name prepended to redirected members.
    pub interface: String,
    /// Member names that trigger the redirect.
    pub members: Vec<String>,
}

/// HTTP transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// One documentation root that publishes an `objects.inv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Identifier used to select the source.
    pub key: String,
    /// Documentation root; the inventory lives at `<base_url>/objects.inv`.
    pub base_url: String,
    /// Primary sources get the interface redirect applied to queries.
    #[serde(default)]
    pub primary: bool,
    /// Human-readable description for listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SourceConfig {
    /// Convenience constructor for a secondary source.
    #[must_use]
    pub fn new(key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            base_url: base_url.into(),
            primary: false,
            description: None,
        }
    }

    /// Mark the source as primary.
    #[must_use]
    pub const fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookup: LookupConfig::default(),
            fetch: FetchConfig::default(),
            sources: default_sources(),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_LIMIT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            matcher: MatcherKind::default(),
            self_project: "discord.py".to_string(),
            namespace_prefixes: vec!["discord.ext.commands.".to_string(), "discord.".to_string()],
            query_qualifier: r"^(?:discord\.(?:ext\.)?)?(?:commands\.)?(.+)".to_string(),
            redirect: RedirectConfig::default(),
        }
    }
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            interface: "abc.Messageable".to_string(),
            members: ["fetch_message", "history", "pins", "send", "trigger_typing", "typing"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new("latest", "https://discordpy.readthedocs.io/en/latest")
            .primary()
            .with_description("discord.py (latest)"),
        SourceConfig::new("latest-jp", "https://discordpy.readthedocs.io/ja/latest")
            .primary()
            .with_description("discord.py (latest, Japanese)"),
        SourceConfig::new("python", "https://docs.python.org/3")
            .with_description("Python 3 standard library"),
        SourceConfig::new("python-jp", "https://docs.python.org/ja/3")
            .with_description("Python 3 standard library (Japanese)"),
    ]
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// A missing file yields [`Config::default`]; an unreadable or malformed
    /// file is an error.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// Path of the configuration file, honoring [`CONFIG_DIR_ENV`].
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed).join(CONFIG_FILE));
            }
        }

        let project_dirs = directories::ProjectDirs::from("dev", "rtfm", "rtfm")
            .ok_or_else(|| Error::Config("Failed to determine project directories".into()))?;
        Ok(project_dirs.config_dir().join(CONFIG_FILE))
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.lookup.max_results == 0 {
            return Err(Error::Config("lookup.max_results must be at least 1".into()));
        }
        if self.lookup.chunk_size == 0 {
            return Err(Error::Config("lookup.chunk_size must be at least 1".into()));
        }
        Regex::new(&self.lookup.query_qualifier)
            .map_err(|e| Error::Config(format!("Invalid lookup.query_qualifier: {e}")))?;

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.key.trim().is_empty() {
                return Err(Error::Config("source key must not be empty".into()));
            }
            if !seen.insert(source.key.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate source key '{}'",
                    source.key
                )));
            }

            let url = Url::parse(&source.base_url).map_err(|e| {
                Error::Config(format!(
                    "source '{}' has invalid base_url '{}': {e}",
                    source.key, source.base_url
                ))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "source '{}' must use http or https, got '{}'",
                    source.key,
                    url.scheme()
                )));
            }
        }

        Ok(())
    }

    /// Normalization rules derived from `[lookup]`.
    #[must_use]
    pub fn normalize_rules(&self) -> NormalizeRules {
        NormalizeRules::new(
            self.lookup.self_project.clone(),
            &self.lookup.namespace_prefixes,
        )
    }

    /// Look up a source by key.
    #[must_use]
    pub fn source(&self, key: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.key == key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();

        assert_eq!(config.lookup.max_results, 8);
        assert_eq!(config.lookup.chunk_size, 16 * 1024);
        let keys: Vec<&str> = config.sources.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["latest", "latest-jp", "python", "python-jp"]);
        assert!(config.source("latest").unwrap().primary);
        assert!(!config.source("python").unwrap().primary);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [lookup]
            max_results = 3

            [[sources]]
            key = "docs"
            base_url = "https://example.com/docs"
            "#,
        )
        .unwrap();

        assert_eq!(config.lookup.max_results, 3);
        assert_eq!(config.lookup.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.lookup.redirect.interface, "abc.Messageable");
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.sources, vec![SourceConfig::new("docs", "https://example.com/docs")]);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.lookup.matcher = MatcherKind::Skim;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_file_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[lookup\nmax_results = ").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_keys() {
        let mut config = Config::default();
        config
            .sources
            .push(SourceConfig::new("python", "https://docs.python.org/3.12"));

        match config.validate() {
            Err(Error::Config(msg)) => assert!(msg.contains("duplicate")),
            other => panic!("expected duplicate key error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut config = Config::default();
        config.sources = vec![SourceConfig::new("bad", "not a url")];
        assert!(config.validate().is_err());

        config.sources = vec![SourceConfig::new("ftp", "ftp://example.com/docs")];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limits_and_bad_regex() {
        let mut config = Config::default();
        config.lookup.max_results = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.lookup.chunk_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.lookup.query_qualifier = "(unclosed".to_string();
        assert!(config.validate().is_err());
    }
}
