//! Per-source cache of parsed inventories.
//!
//! Each configured source owns a slot. A slot is either empty (never built,
//! or every build so far failed) or holds a complete [`InventorySource`];
//! readers never observe a half-built table.
//!
//! Builds are single-flight per source: concurrent first lookups share one
//! fetch and parse, and callers that queued behind a build receive its
//! outcome (success or failure) instead of starting another one. Slots are
//! independent, so building one source never blocks another.
//!
//! [`SourceCache::refresh`] rebuilds a slot and swaps the new table in only on
//! success; a failed refresh keeps serving the previous table.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use futures::future::join_all;
use indexmap::IndexMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::SourceConfig;
use crate::fetcher::{InventoryFetch, inventory_url};
use crate::inventory::{NormalizeRules, build_source};
use crate::types::InventorySource;
use crate::{Error, Result};

struct Slot {
    config: SourceConfig,
    current: ArcSwapOption<InventorySource>,
    /// Number of finished build attempts, readable without the gate.
    finished: AtomicU64,
    gate: Mutex<BuildGate>,
}

#[derive(Default)]
struct BuildGate {
    finished: u64,
    last_error: Option<Error>,
}

impl Slot {
    fn new(config: SourceConfig) -> Self {
        Self {
            config,
            current: ArcSwapOption::empty(),
            finished: AtomicU64::new(0),
            gate: Mutex::new(BuildGate::default()),
        }
    }
}

/// Lazily built, refreshable lookup tables for every configured source.
pub struct SourceCache {
    slots: IndexMap<String, Arc<Slot>>,
    fetcher: Arc<dyn InventoryFetch>,
    rules: Arc<NormalizeRules>,
    chunk_size: usize,
}

impl SourceCache {
    /// Create an empty cache over `sources`.
    ///
    /// Nothing is fetched until a source is first requested.
    pub fn new(
        sources: impl IntoIterator<Item = SourceConfig>,
        fetcher: Arc<dyn InventoryFetch>,
        rules: NormalizeRules,
        chunk_size: usize,
    ) -> Self {
        let slots = sources
            .into_iter()
            .map(|config| (config.key.clone(), Arc::new(Slot::new(config))))
            .collect();

        Self {
            slots,
            fetcher,
            rules: Arc::new(rules),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Configured sources, in configuration order.
    pub fn sources(&self) -> impl Iterator<Item = &SourceConfig> {
        self.slots.values().map(|slot| &slot.config)
    }

    /// Configuration for one source.
    pub fn source(&self, key: &str) -> Result<&SourceConfig> {
        self.slot(key).map(|slot| &slot.config)
    }

    /// The cached table for `key`, without building it.
    #[must_use]
    pub fn cached(&self, key: &str) -> Option<Arc<InventorySource>> {
        self.slots.get(key).and_then(|slot| slot.current.load_full())
    }

    /// Return the table for `key`, building it on first access.
    pub async fn get_or_build(&self, key: &str) -> Result<Arc<InventorySource>> {
        let slot = self.slot(key)?;
        if let Some(source) = slot.current.load_full() {
            return Ok(source);
        }

        let observed = slot.finished.load(Ordering::Acquire);
        let mut gate = slot.gate.lock().await;

        if let Some(source) = slot.current.load_full() {
            return Ok(source);
        }
        if gate.finished != observed {
            // a build finished while we queued; share its failure
            if let Some(err) = &gate.last_error {
                debug!(source = key, "reusing outcome of concurrent build");
                return Err(err.clone());
            }
        }

        self.run_build(slot, &mut gate).await
    }

    /// Rebuild `key` now.
    ///
    /// On success the new table replaces the old one atomically. On failure
    /// the previous table, if any, stays in place and the error is returned.
    pub async fn refresh(&self, key: &str) -> Result<Arc<InventorySource>> {
        let slot = self.slot(key)?;
        let mut gate = slot.gate.lock().await;
        let had_previous = slot.current.load().is_some();

        let outcome = self.run_build(slot, &mut gate).await;
        if let Err(err) = &outcome {
            if had_previous {
                warn!(source = key, error = %err, "refresh failed; keeping previous table");
            }
        }
        outcome
    }

    /// Refresh every configured source concurrently.
    pub async fn refresh_all(&self) -> Vec<(String, Result<Arc<InventorySource>>)> {
        let refreshes = self.slots.keys().map(|key| async move {
            let outcome = self.refresh(key).await;
            (key.clone(), outcome)
        });
        join_all(refreshes).await
    }

    fn slot(&self, key: &str) -> Result<&Arc<Slot>> {
        self.slots
            .get(key)
            .ok_or_else(|| Error::UnknownSource(key.to_string()))
    }

    /// Fetch and parse one source while holding its gate.
    async fn run_build(&self, slot: &Slot, gate: &mut BuildGate) -> Result<Arc<InventorySource>> {
        let outcome = self.build(&slot.config).await;

        gate.finished += 1;
        match &outcome {
            Ok(source) => {
                slot.current.store(Some(Arc::clone(source)));
                gate.last_error = None;
            },
            Err(err) => {
                gate.last_error = Some(err.clone());
            },
        }
        slot.finished.store(gate.finished, Ordering::Release);

        outcome
    }

    async fn build(&self, config: &SourceConfig) -> Result<Arc<InventorySource>> {
        let url = inventory_url(&config.base_url);
        debug!(source = %config.key, %url, "building lookup table");

        let bytes = self.fetcher.fetch(&url).await?;

        let key = config.key.clone();
        let base_url = config.base_url.clone();
        let rules = Arc::clone(&self.rules);
        let chunk_size = self.chunk_size;
        let source = tokio::task::spawn_blocking(move || {
            build_source(&key, &base_url, &bytes, &rules, chunk_size)
        })
        .await
        .map_err(|e| Error::Other(format!("inventory parse task failed: {e}")))?;

        match source {
            Ok(source) => {
                info!(
                    source = %config.key,
                    project = %source.project_name,
                    entries = source.len(),
                    "built lookup table"
                );
                Ok(Arc::new(source))
            },
            Err(err) => {
                warn!(source = %config.key, error = %err, "cannot build lookup table");
                Err(err)
            },
        }
    }
}
