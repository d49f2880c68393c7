use thiserror::Error;

/// Failure taxonomy for the aggregation pipeline.
///
/// Per-record problems (unparseable year, unresolvable country code, null
/// value) are not part of this taxonomy: they are expected data-quality
/// conditions, dropped at the observation level and logged, never surfaced
/// as errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Network or HTTP failure reaching the World Bank API, after retries.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The API answered with an error payload or an unexpected shape.
    #[error("world bank api error: {0}")]
    Api(String),

    /// The fetched or assembled data is missing a column a downstream
    /// consumer requires (e.g. no resolvable country code). Fatal; raised
    /// instead of producing a partially usable table.
    #[error("schema error: {0}")]
    Schema(String),

    /// Invalid static configuration (empty indicator set, unknown primary,
    /// inverted year range).
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
