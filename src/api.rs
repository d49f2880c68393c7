//! Synchronous client for the **World Bank Indicators API (v2)**.
//!
//! Covers the `country/{codes}/indicator/{code}` data endpoint and the
//! `country` classification endpoint, returning tidy [`Observation`] and
//! [`CountryMeta`] rows. Pagination is handled automatically: the first
//! page's metadata block declares the total page count and exactly that many
//! follow-up requests are issued.
//!
//! ### Notes
//! - The API sometimes serializes `per_page` as a **string**; we accept both
//!   string/number.
//! - Records without a resolvable ISO3 code or a parseable year, and records
//!   with a null value, are dropped from the returned series. They are
//!   counted and logged, never raised.
//! - Network timeouts use a sane default (30s) and can be adjusted by editing
//!   the client builder.

use crate::error::{Error, Result};
use crate::models::{CountryEntry, CountryMeta, CountryScope, Entry, Meta, Observation, YearRange};
use log::{debug, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

/// Page size for indicator queries; large enough that most single-indicator
/// scopes fit on one page.
const INDICATOR_PER_PAGE: u32 = 20_000;
/// Page size for the country list (~300 entries total).
const COUNTRY_PER_PAGE: u32 = 400;
/// Safety cap to avoid pathological pagination jobs.
const MAX_PAGES: u32 = 1000;

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("macrobank/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("reqwest client build");
        Self {
            base_url: "https://api.worldbank.org/v2".into(),
            http,
        }
    }
}

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc_join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|s| percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string())
        .collect::<Vec<_>>()
        .join(";")
}

fn scope_path(scope: &CountryScope) -> String {
    match scope {
        CountryScope::All => "all".into(),
        CountryScope::Codes(codes) => enc_join(codes.iter().map(|s| s.as_str())),
    }
}

/// Split a `[Meta, [record, ...]]` response into its two parts.
///
/// An API-level error arrives as a one-element array whose first entry
/// carries a `message` field; it is surfaced as [`Error::Api`].
pub fn parse_page(v: &Value) -> Result<(Meta, Vec<Value>)> {
    let arr = v
        .as_array()
        .ok_or_else(|| Error::Api("unexpected response shape: not a top-level array".into()))?;
    if arr.is_empty() {
        return Err(Error::Api("unexpected response: empty array".into()));
    }
    if arr[0].get("message").is_some() {
        return Err(Error::Api(arr[0].to_string()));
    }
    let meta: Meta = serde_json::from_value(arr[0].clone())
        .map_err(|e| Error::Api(format!("parse meta: {e}")))?;
    let records: Vec<Value> = if arr.len() > 1 {
        arr[1].as_array().cloned().unwrap_or_default()
    } else {
        vec![]
    };
    Ok((meta, records))
}

impl Client {
    fn get_json(&self, url: &str) -> Result<Value> {
        // Small retry for transient failures (5xx / network errors)
        let mut last_err: Option<String> = None;
        for backoff_ms in [100u64, 300, 700] {
            match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => {
                    return r
                        .json()
                        .map_err(|e| Error::Api(format!("decode json from {url}: {e}")));
                }
                Ok(r) if r.status().is_server_error() => {
                    last_err = Some(format!("HTTP {}", r.status()));
                }
                Ok(r) => {
                    return Err(Error::Transport(format!(
                        "GET {url} failed with HTTP {}",
                        r.status()
                    )));
                }
                Err(e) => last_err = Some(e.to_string()),
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        Err(Error::Transport(format!(
            "GET {url}: {}",
            last_err.unwrap_or_else(|| "unknown network error".into())
        )))
    }

    /// Walk every page of a paginated endpoint, collecting raw records.
    ///
    /// The first page's [`Meta`] declares the total page count P; pages
    /// 2..=P are then requested exactly once each.
    fn fetch_all_pages(&self, base: &str) -> Result<Vec<Value>> {
        let first = self.get_json(&format!("{base}&page=1"))?;
        let (meta, mut records) = parse_page(&first)?;

        let pages = meta.pages.min(MAX_PAGES);
        for page in 2..=pages {
            let v = self.get_json(&format!("{base}&page={page}"))?;
            let (_, more) = parse_page(&v)?;
            records.extend(more);
        }
        debug!(
            "fetched {} records over {} page(s) from {base}",
            records.len(),
            pages.max(1)
        );
        Ok(records)
    }

    /// Fetch one indicator's full time series for the given scope and years.
    ///
    /// The result is an unordered set of valid observations; an indicator
    /// with no data yields an empty vec, not an error. Records whose value
    /// is null contribute no row.
    ///
    /// Fails with [`Error::Schema`] when the endpoint returned records but
    /// none carried a resolvable country code, since every downstream join
    /// is keyed on it.
    pub fn fetch_indicator(
        &self,
        indicator_code: &str,
        scope: &CountryScope,
        years: YearRange,
    ) -> Result<Vec<Observation>> {
        let url = format!(
            "{}/country/{}/indicator/{}?format=json&per_page={}&date={}",
            self.base_url,
            scope_path(scope),
            percent_encoding::utf8_percent_encode(indicator_code.trim(), SAFE),
            INDICATOR_PER_PAGE,
            years.to_query_param(),
        );

        let raw = self.fetch_all_pages(&url)?;
        let total = raw.len();

        let mut resolvable = 0usize;
        let mut out = Vec::with_capacity(total);
        for v in raw {
            let entry: Entry = match serde_json::from_value(v) {
                Ok(e) => e,
                Err(e) => {
                    debug!("{indicator_code}: skipping malformed record: {e}");
                    continue;
                }
            };
            if entry.resolve_iso3().is_some() {
                resolvable += 1;
            }
            // Null values and unparseable years are dropped here as well.
            if let Some(obs) = entry.into_observation() {
                out.push(obs);
            }
        }

        if total > 0 && resolvable == 0 {
            return Err(Error::Schema(format!(
                "{indicator_code}: no record carries a resolvable country code"
            )));
        }
        if out.len() < total {
            debug!(
                "{indicator_code}: kept {} of {} records (dropped nulls/malformed)",
                out.len(),
                total
            );
        }
        Ok(out)
    }

    /// Fetch the global country list with region/income/lending
    /// classification. One row per country; records missing id or name are
    /// dropped.
    pub fn fetch_countries(&self) -> Result<Vec<CountryMeta>> {
        let url = format!(
            "{}/country?format=json&per_page={}",
            self.base_url, COUNTRY_PER_PAGE
        );
        let raw = self.fetch_all_pages(&url)?;

        let mut out = Vec::with_capacity(raw.len());
        for v in raw {
            let entry: CountryEntry = match serde_json::from_value(v) {
                Ok(e) => e,
                Err(e) => {
                    warn!("country list: skipping malformed record: {e}");
                    continue;
                }
            };
            if let Some(meta) = entry.into_country_meta() {
                out.push(meta);
            }
        }
        Ok(out)
    }
}
