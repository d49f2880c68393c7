//! Keyed joins over indicator series.
//!
//! Two distinct merge modes serve two distinct consumers:
//!
//! - [`merge_primary_left`]: wide table anchored on a privileged primary
//!   series. Used by the "latest complete row" build.
//! - [`merge_long`]: full union in long format, indicator identity as a
//!   column. Used by the dashboard data loader.
//!
//! Neither mode orders its output; callers sort.

use crate::config::IndicatorSpec;
use crate::models::{LongRow, MergedRow, Observation};
use ahash::{AHashMap, AHashSet};
use log::warn;

/// Left-merge secondary series onto the primary's (iso3, year) universe.
///
/// `values[0]` of every row holds the primary value; `values[1 + i]` holds
/// series `secondaries[i]`, or `None` when that series has no observation
/// for the key. A (country, year) pair present only in a secondary series is
/// not represented: the primary defines the join universe.
///
/// Output rows are unique per (iso3, year). A duplicate key inside the
/// primary keeps the first occurrence.
pub fn merge_primary_left(
    primary: &[Observation],
    secondaries: &[Vec<Observation>],
) -> Vec<MergedRow> {
    let width = 1 + secondaries.len();

    let mut rows: Vec<MergedRow> = Vec::with_capacity(primary.len());
    let mut index: AHashMap<(&str, i32), usize> = AHashMap::with_capacity(primary.len());
    for obs in primary {
        if index.contains_key(&(obs.iso3.as_str(), obs.year)) {
            warn!("duplicate primary key ({}, {}), keeping first", obs.iso3, obs.year);
            continue;
        }
        let mut values = vec![None; width];
        values[0] = Some(obs.value);
        index.insert((obs.iso3.as_str(), obs.year), rows.len());
        rows.push(MergedRow {
            iso3: obs.iso3.clone(),
            country_name: obs.country_name.clone(),
            year: obs.year,
            values,
        });
    }

    for (i, series) in secondaries.iter().enumerate() {
        for obs in series {
            if let Some(&at) = index.get(&(obs.iso3.as_str(), obs.year)) {
                let cell = &mut rows[at].values[1 + i];
                if cell.is_none() {
                    *cell = Some(obs.value);
                }
            }
            // keys outside the primary universe are dropped by design
        }
    }

    rows
}

/// Concatenate tagged series into one long table: one row per observation,
/// no privileged series, full union of keys. Duplicate (indicator, iso3,
/// year) observations keep the first occurrence.
///
/// Classification columns are left empty here; the assembler joins country
/// metadata afterwards.
pub fn merge_long(series: &[(IndicatorSpec, Vec<Observation>)]) -> Vec<LongRow> {
    let mut seen: AHashSet<(&str, &str, i32)> = AHashSet::new();
    let mut out = Vec::with_capacity(series.iter().map(|(_, s)| s.len()).sum());
    for (spec, observations) in series {
        for obs in observations {
            if !seen.insert((spec.key.as_str(), obs.iso3.as_str(), obs.year)) {
                warn!(
                    "duplicate observation ({}, {}, {}), keeping first",
                    spec.key, obs.iso3, obs.year
                );
                continue;
            }
            out.push(LongRow {
                iso3: obs.iso3.clone(),
                country: obs.country_name.clone(),
                year: obs.year,
                value: obs.value,
                indicator: spec.key.clone(),
                indicator_code: spec.code.clone(),
                unit: spec.unit.clone(),
                region: None,
                income: None,
                lending: None,
            });
        }
    }
    out
}
