use serde::{Deserialize, Serialize};

/// Inclusive year range for API queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    /// Returns `None` when `start > end`.
    pub fn new(start: i32, end: i32) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn to_query_param(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }
}

/// Which countries an indicator query covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CountryScope {
    /// Every country the API knows about.
    All,
    /// Explicit ISO3 codes, semicolon-joined in the URL path.
    Codes(Vec<String>),
}

impl CountryScope {
    /// Build an explicit scope; empty or blank-only lists are rejected.
    pub fn codes<I, S>(codes: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let v: Vec<String> = codes
            .into_iter()
            .map(|s| s.into().trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        (!v.is_empty()).then_some(Self::Codes(v))
    }
}

/// Metadata section returned by the API (position 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub page: u32,
    pub pages: u32,
    /// Some responses encode `per_page` as a string, others as a number.
    /// Accept both and normalize to `u32`.
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    pub total: u32,
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as u32)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("negative value for u32"));
            }
            Ok(v as u32)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeName {
    pub id: String,
    pub value: Option<String>,
}

/// Raw observation record from `country/{..}/indicator/{..}` (position 1 array).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub country: Option<CodeName>,
    #[serde(default)]
    pub countryiso3code: Option<String>,
    pub date: Option<String>,
    pub value: Option<f64>,
}

impl Entry {
    /// Resolve the ISO3 code: `countryiso3code` first, then `country.id`.
    /// `""` and `"NA"` count as unresolvable.
    pub fn resolve_iso3(&self) -> Option<String> {
        self.countryiso3code
            .as_deref()
            .filter(|s| !s.is_empty() && *s != "NA")
            .or_else(|| {
                self.country
                    .as_ref()
                    .map(|c| c.id.as_str())
                    .filter(|s| !s.is_empty() && *s != "NA")
            })
            .map(str::to_owned)
    }

    /// Validate and normalize into an [`Observation`].
    ///
    /// Returns `None` when the record has no resolvable country code, an
    /// unparseable year, or a null value. Such records are dropped, never
    /// turned into a fetch error.
    pub fn into_observation(self) -> Option<Observation> {
        let iso3 = self.resolve_iso3()?;
        let year = self.date.as_deref()?.trim().parse::<i32>().ok()?;
        let value = self.value?;
        let country_name = self.country.and_then(|c| c.value);
        Some(Observation {
            iso3,
            country_name,
            year,
            value,
        })
    }
}

/// Tidy observation used by this crate (one row = one (country, year) value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub iso3: String,
    pub country_name: Option<String>,
    pub year: i32,
    pub value: f64,
}

/// Raw country record from the `country` endpoint. The classification
/// fields arrive as nested `{"id":..,"value":..}` objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryEntry {
    pub id: Option<String>,
    pub name: Option<String>,
    pub region: Option<CodeName>,
    #[serde(rename = "incomeLevel")]
    pub income_level: Option<CodeName>,
    #[serde(rename = "lendingType")]
    pub lending_type: Option<CodeName>,
}

impl CountryEntry {
    /// Records missing id or name are dropped.
    pub fn into_country_meta(self) -> Option<CountryMeta> {
        let iso3 = self.id.filter(|s| !s.is_empty())?;
        let country = self.name.filter(|s| !s.is_empty())?;
        Some(CountryMeta {
            iso3,
            country,
            region: self.region.and_then(|c| c.value),
            income: self.income_level.and_then(|c| c.value),
            lending: self.lending_type.and_then(|c| c.value),
        })
    }
}

/// One country's classification row, fetched once per session and cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryMeta {
    pub iso3: String,
    pub country: String,
    pub region: Option<String>,
    pub income: Option<String>,
    pub lending: Option<String>,
}

/// Wide row keyed by (iso3, year): one cell per merged indicator, in merge
/// order. A cell is `None` when that indicator has no observation for the
/// (country, year) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub iso3: String,
    pub country_name: Option<String>,
    pub year: i32,
    pub values: Vec<Option<f64>>,
}

/// Long-format row: one per (country, year, indicator) observation, with the
/// indicator identified by columns rather than position, optionally enriched
/// with country classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRow {
    pub iso3: String,
    pub country: Option<String>,
    pub year: i32,
    pub value: f64,
    pub indicator: String,
    pub indicator_code: String,
    pub unit: String,
    pub region: Option<String>,
    pub income: Option<String>,
    pub lending: Option<String>,
}
