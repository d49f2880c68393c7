//! Static pipeline configuration: which indicators, which countries, which
//! years. These are compile-time defaults mirroring the dashboard's macro
//! table, not runtime flags; the CLI only lets callers narrow them.

use crate::error::{Error, Result};
use crate::models::{CountryScope, YearRange};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One configured indicator: the output column it feeds and its API identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    /// Output column name, e.g. `gdp_growth_pct`.
    pub key: String,
    /// World Bank indicator code, e.g. `NY.GDP.MKTP.KD.ZG`.
    pub code: String,
    pub unit: String,
    pub desc: String,
}

impl IndicatorSpec {
    pub fn new(key: &str, code: &str, unit: &str, desc: &str) -> Self {
        Self {
            key: key.into(),
            code: code.into(),
            unit: unit.into(),
            desc: desc.into(),
        }
    }
}

/// Everything the assembler needs to build either artifact.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Column order of the wide table follows this order.
    pub indicators: Vec<IndicatorSpec>,
    /// Key of the indicator that anchors the join universe and whose fetch
    /// failure aborts the narrow build.
    pub primary: String,
    pub scope: CountryScope,
    pub years: YearRange,
    pub cache_ttl: Duration,
    /// Politeness pause between consecutive indicator fetches.
    pub fetch_delay: Duration,
}

/// ASEAN members plus comparator economies, ISO3.
pub const DEFAULT_COUNTRIES: [&str; 14] = [
    "BRN", "KHM", "IDN", "LAO", "MYS", "MMR", "PHL", "SGP", "THA", "VNM", // ASEAN
    "USA", "JPN", "CHN", "DEU", // comparators
];

impl Default for PipelineConfig {
    fn default() -> Self {
        let indicators = vec![
            IndicatorSpec::new(
                "gdp_growth_pct",
                "NY.GDP.MKTP.KD.ZG",
                "percent",
                "GDP growth (annual %). Source: World Bank WDI.",
            ),
            IndicatorSpec::new(
                "inflation_cpi_pct",
                "FP.CPI.TOTL.ZG",
                "percent",
                "Inflation, consumer prices (annual %). Source: World Bank WDI.",
            ),
            IndicatorSpec::new(
                "unemployment_pct",
                "SL.UEM.TOTL.ZS",
                "percent",
                "Unemployment, total (% of labor force, modeled ILO). Source: World Bank WDI.",
            ),
        ];
        let end = Utc::now().year();
        Self {
            indicators,
            primary: "gdp_growth_pct".into(),
            scope: CountryScope::codes(DEFAULT_COUNTRIES).expect("non-empty default scope"),
            years: YearRange { start: 1990, end },
            cache_ttl: Duration::from_secs(24 * 3600),
            fetch_delay: Duration::from_millis(200),
        }
    }
}

impl PipelineConfig {
    /// Index of the primary indicator within `indicators`.
    pub fn primary_index(&self) -> Option<usize> {
        self.indicators.iter().position(|s| s.key == self.primary)
    }

    pub fn validate(&self) -> Result<()> {
        if self.indicators.is_empty() {
            return Err(Error::Config("no indicators configured".into()));
        }
        if self.primary_index().is_none() {
            return Err(Error::Config(format!(
                "primary indicator {:?} is not among the configured indicators",
                self.primary
            )));
        }
        if self.years.start > self.years.end {
            return Err(Error::Config(format!(
                "year range {}:{} has start after end",
                self.years.start, self.years.end
            )));
        }
        if let CountryScope::Codes(codes) = &self.scope {
            if codes.is_empty() {
                return Err(Error::Config("country scope list is empty".into()));
            }
        }
        Ok(())
    }
}
