use crate::assemble::WideDataset;
use crate::error::Result;
use crate::models::LongRow;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn fmt_cell(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => x.to_string(),
        _ => String::new(),
    }
}

/// Save the wide table as CSV: `country,iso3,year` then one column per
/// indicator in dataset order. Missing cells are empty, not placeholders.
pub fn save_wide_csv<P: AsRef<Path>>(dataset: &WideDataset, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;

    let mut header = vec!["country".to_string(), "iso3".to_string(), "year".to_string()];
    header.extend(dataset.indicator_keys.iter().cloned());
    wtr.write_record(&header)?;

    for row in &dataset.rows {
        let mut record = vec![
            row.country_name.clone().unwrap_or_default(),
            row.iso3.clone(),
            row.year.to_string(),
        ];
        record.extend(row.values.iter().map(|v| fmt_cell(*v)));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the long table as CSV with header.
pub fn save_long_csv<P: AsRef<Path>>(rows: &[LongRow], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize((
        "iso3",
        "country",
        "year",
        "value",
        "indicator",
        "indicator_code",
        "unit",
        "region",
        "income",
        "lending",
    ))?;
    for r in rows {
        wtr.serialize((
            &r.iso3,
            &r.country,
            r.year,
            r.value,
            &r.indicator,
            &r.indicator_code,
            &r.unit,
            &r.region,
            &r.income,
            &r.lending,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the long table as a pretty JSON array.
pub fn save_long_json<P: AsRef<Path>>(rows: &[LongRow], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
