//! Per-country "latest complete row" selection.

use crate::models::MergedRow;
use ahash::AHashMap;

/// Pick exactly one row per country from a merged set.
///
/// Policy, in order:
/// 1. keep the years where every column index in `required` is non-null;
/// 2. if any survive, take the one with the maximum year;
/// 3. otherwise fall back to the maximum year of the full set for that
///    country, missing cells staying null.
///
/// The decision is per-country and a pure function of the input set: output
/// is sorted by iso3, so re-running on the same rows (in any order) yields
/// the same result. Countries without rows are simply absent.
pub fn latest_complete_rows(rows: &[MergedRow], required: &[usize]) -> Vec<MergedRow> {
    let mut by_country: AHashMap<&str, Vec<&MergedRow>> = AHashMap::new();
    for row in rows {
        by_country.entry(row.iso3.as_str()).or_default().push(row);
    }

    let is_complete = |row: &MergedRow| {
        required
            .iter()
            .all(|&i| row.values.get(i).is_some_and(|v| v.is_some()))
    };

    let mut out: Vec<MergedRow> = Vec::with_capacity(by_country.len());
    for group in by_country.into_values() {
        let mut best_complete: Option<&MergedRow> = None;
        let mut best_any: Option<&MergedRow> = None;
        for row in group {
            if best_any.is_none_or(|b| row.year > b.year) {
                best_any = Some(row);
            }
            if is_complete(row) && best_complete.is_none_or(|b| row.year > b.year) {
                best_complete = Some(row);
            }
        }
        if let Some(row) = best_complete.or(best_any) {
            out.push(row.clone());
        }
    }

    out.sort_by(|a, b| a.iso3.cmp(&b.iso3));
    out
}
