//! Orchestration: fetch → merge → select/enrich → sort, behind a TTL cache.
//!
//! Two build paths share one [`Assembler`]:
//!
//! - [`Assembler::build_latest`]: the narrow "latest complete row per
//!   country" wide table, anchored on the primary indicator.
//! - [`Assembler::load_long`]: the full long-format table of every
//!   configured indicator, enriched with country classification.

use crate::api::Client;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::merge::{merge_long, merge_primary_left};
use crate::models::{CountryMeta, CountryScope, LongRow, MergedRow, Observation, YearRange};
use crate::select::latest_complete_rows;
use ahash::AHashMap;
use log::warn;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Process-wide cache with per-entry expiry. Owned by whoever constructs it,
/// no module-level singleton; hand the owning [`Assembler`] around instead.
///
/// The map lock is held across a rebuild, so a second caller arriving while
/// a key is being rebuilt waits for the in-flight result rather than
/// observing partial data.
pub struct Cache<K, V> {
    ttl: Duration,
    entries: Mutex<AHashMap<K, (Instant, Arc<V>)>>,
}

impl<K: Eq + Hash, V> Cache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(AHashMap::new()),
        }
    }

    /// Return the cached value for `key`, or run `build`, cache its result,
    /// and return it. A failed build caches nothing.
    pub fn get_or_build<F>(&self, key: K, build: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Result<V>,
    {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some((built_at, value)) = entries.get(&key) {
            if built_at.elapsed() < self.ttl {
                return Ok(Arc::clone(value));
            }
        }
        let value = Arc::new(build()?);
        entries.insert(key, (Instant::now(), Arc::clone(&value)));
        Ok(value)
    }
}

/// The narrow build's artifact: one selected row per country, columns in the
/// configured indicator order, rows sorted by country name ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct WideDataset {
    pub indicator_keys: Vec<String>,
    pub rows: Vec<MergedRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DatasetKey {
    codes: Vec<String>,
    years: YearRange,
    scope: CountryScope,
}

pub struct Assembler {
    client: Client,
    config: PipelineConfig,
    wide_cache: Cache<DatasetKey, WideDataset>,
    long_cache: Cache<DatasetKey, Vec<LongRow>>,
    country_cache: Cache<(), Vec<CountryMeta>>,
}

impl Assembler {
    pub fn new(client: Client, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let ttl = config.cache_ttl;
        Ok(Self {
            client,
            config,
            wide_cache: Cache::new(ttl),
            long_cache: Cache::new(ttl),
            country_cache: Cache::new(ttl),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn dataset_key(&self) -> DatasetKey {
        DatasetKey {
            codes: self.config.indicators.iter().map(|s| s.code.clone()).collect(),
            years: self.config.years,
            scope: self.config.scope.clone(),
        }
    }

    /// Fetch one configured indicator, pausing the configured delay first
    /// when it is not the first call of the batch.
    fn fetch_series(&self, code: &str, first: bool) -> Result<Vec<Observation>> {
        if !first {
            std::thread::sleep(self.config.fetch_delay);
        }
        self.client
            .fetch_indicator(code, &self.config.scope, self.config.years)
    }

    /// Build the "latest complete row per country" wide table.
    ///
    /// The primary indicator's fetch failure aborts the build; a secondary's
    /// transport failure degrades to an all-null column. Selection requires
    /// every configured indicator to be non-null, falling back per country
    /// to the latest primary year.
    pub fn build_latest(&self) -> Result<Arc<WideDataset>> {
        let key = self.dataset_key();
        self.wide_cache.get_or_build(key, || self.build_latest_uncached())
    }

    fn build_latest_uncached(&self) -> Result<WideDataset> {
        let pidx = self
            .config
            .primary_index()
            .ok_or_else(|| Error::Config("primary indicator not configured".into()))?;

        // Primary first: without the anchor series there is nothing to build.
        let primary = self.fetch_series(&self.config.indicators[pidx].code, true)?;

        let mut secondaries: Vec<Vec<Observation>> = Vec::new();
        // merge column j maps back to config column merge_to_config[j]
        let mut merge_to_config: Vec<usize> = vec![pidx];
        for (i, spec) in self.config.indicators.iter().enumerate() {
            if i == pidx {
                continue;
            }
            // Only transport failures degrade; an API rejection means the
            // configured code itself is wrong and must surface.
            let series = match self.fetch_series(&spec.code, false) {
                Ok(s) => s,
                Err(e @ Error::Transport(_)) => {
                    warn!("{}: fetch failed, column will be null: {e}", spec.key);
                    Vec::new()
                }
                Err(e) => return Err(e),
            };
            merge_to_config.push(i);
            secondaries.push(series);
        }

        let merged = merge_primary_left(&primary, &secondaries);
        let width = self.config.indicators.len();
        let required: Vec<usize> = (0..width).collect();
        let selected = latest_complete_rows(&merged, &required);

        // Permute merge-order cells into configured column order.
        let mut rows: Vec<MergedRow> = selected
            .into_iter()
            .map(|mut row| {
                let mut values = vec![None; width];
                for (j, &cfg_idx) in merge_to_config.iter().enumerate() {
                    values[cfg_idx] = row.values[j];
                }
                row.values = values;
                row
            })
            .collect();

        rows.sort_by(|a, b| match (&a.country_name, &b.country_name) {
            (Some(x), Some(y)) => x.cmp(y).then_with(|| a.iso3.cmp(&b.iso3)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.iso3.cmp(&b.iso3),
        });

        Ok(WideDataset {
            indicator_keys: self.config.indicators.iter().map(|s| s.key.clone()).collect(),
            rows,
        })
    }

    /// Country classification, fetched once per TTL window.
    pub fn countries(&self) -> Result<Arc<Vec<CountryMeta>>> {
        self.country_cache.get_or_build((), || self.client.fetch_countries())
    }

    /// Build the long-format table: every configured indicator's series,
    /// tagged with its identity, concatenated and left-joined with country
    /// classification on iso3.
    ///
    /// No series is privileged here: a transport failure on any one
    /// indicator drops that series with a warning and the assembly
    /// proceeds. An empty result is a valid empty dataset.
    pub fn load_long(&self) -> Result<Arc<Vec<LongRow>>> {
        let key = self.dataset_key();
        self.long_cache.get_or_build(key, || self.load_long_uncached())
    }

    fn load_long_uncached(&self) -> Result<Vec<LongRow>> {
        let countries = self.countries()?;

        let mut tagged = Vec::with_capacity(self.config.indicators.len());
        for (i, spec) in self.config.indicators.iter().enumerate() {
            match self.fetch_series(&spec.code, i == 0) {
                Ok(series) => tagged.push((spec.clone(), series)),
                Err(e @ Error::Transport(_)) => {
                    warn!("{}: fetch failed, series skipped: {e}", spec.key)
                }
                Err(e) => return Err(e),
            }
        }

        let mut rows = merge_long(&tagged);

        let by_iso3: AHashMap<&str, &CountryMeta> =
            countries.iter().map(|c| (c.iso3.as_str(), c)).collect();
        for row in &mut rows {
            if let Some(meta) = by_iso3.get(row.iso3.as_str()) {
                row.region = meta.region.clone();
                row.income = meta.income.clone();
                row.lending = meta.lending.clone();
            }
        }

        Ok(rows)
    }
}
