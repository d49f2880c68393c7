//! macrobank
//!
//! A lightweight Rust library for aggregating World Bank macro indicator
//! data per country. Pairs with the `macrobank` CLI.
//!
//! ### Features
//! - Fetch indicator time series (paginated) and the country classification list
//! - Merge N indicator series by (iso3, year): primary-anchored wide mode or
//!   full-union long mode
//! - Select the latest year per country where every required indicator is
//!   present, falling back to the latest primary year
//! - Export the result as CSV or JSON
//! - TTL-cached assembly, no network on a cache hit
//!
//! ### Example
//! ```no_run
//! use macrobank::{Assembler, Client, PipelineConfig};
//!
//! let assembler = Assembler::new(Client::default(), PipelineConfig::default())?;
//! let dataset = assembler.build_latest()?;
//! macrobank::storage::save_wide_csv(&dataset, "macro_indicators_worldbank_latest.csv")?;
//! # Ok::<(), macrobank::Error>(())
//! ```

pub mod api;
pub mod assemble;
pub mod config;
pub mod error;
pub mod merge;
pub mod models;
pub mod select;
pub mod storage;

pub use api::Client;
pub use assemble::{Assembler, Cache, WideDataset};
pub use config::{IndicatorSpec, PipelineConfig};
pub use error::{Error, Result};
pub use models::{CountryMeta, CountryScope, LongRow, MergedRow, Observation, YearRange};
