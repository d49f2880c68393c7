use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use macrobank::{Assembler, Client, CountryScope, PipelineConfig, YearRange, storage};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "macrobank",
    version,
    about = "Fetch, merge & export World Bank macro indicators per country"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the latest-complete-row-per-country table and save it as CSV.
    Build(BuildArgs),
    /// Load the full long-format table (all indicators, all years) and save it.
    Load(LoadArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// ISO3 codes separated by comma or semicolon, or "all".
    /// Defaults to the configured ASEAN + comparator list.
    #[arg(short, long)]
    countries: Option<String>,
    /// Year range (YYYY:YYYY). Defaults to 1990 through the current year.
    #[arg(short = 'd', long)]
    date: Option<String>,
    /// Output CSV path.
    #[arg(long, default_value = "data/macro_indicators_worldbank_latest.csv")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct LoadArgs {
    /// ISO3 codes separated by comma or semicolon, or "all" (default).
    #[arg(short, long, default_value = "all")]
    countries: String,
    /// Year range (YYYY:YYYY). Defaults to 1990 through the current year.
    #[arg(short = 'd', long)]
    date: Option<String>,
    /// Output path (format inferred by --format or extension).
    #[arg(long)]
    out: PathBuf,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

fn parse_scope(s: &str) -> Result<CountryScope> {
    if s.trim().eq_ignore_ascii_case("all") {
        return Ok(CountryScope::All);
    }
    CountryScope::codes(s.split([',', ';']))
        .ok_or_else(|| anyhow::anyhow!("invalid --countries, expected ISO3 codes or \"all\""))
}

fn parse_years(s: &str) -> Result<YearRange> {
    let (a, b) = s
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("invalid --date, expected YYYY:YYYY"))?;
    let start = a.trim().parse::<i32>()?;
    let end = b.trim().parse::<i32>()?;
    YearRange::new(start, end)
        .ok_or_else(|| anyhow::anyhow!("invalid --date, start year is after end year"))
}

fn configure(countries: Option<&str>, date: Option<&str>) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::default();
    if let Some(s) = countries {
        config.scope = parse_scope(s)?;
    }
    if let Some(s) = date {
        config.years = parse_years(s)?;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Load(args) => cmd_load(args),
    }
}

fn cmd_build(args: BuildArgs) -> Result<()> {
    let config = configure(args.countries.as_deref(), args.date.as_deref())?;
    let assembler = Assembler::new(Client::default(), config)?;

    let dataset = assembler.build_latest()?;
    if let Some(dir) = args.out.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    storage::save_wide_csv(&dataset, &args.out)?;
    eprintln!("Saved: {} (rows={})", args.out.display(), dataset.rows.len());
    Ok(())
}

fn cmd_load(args: LoadArgs) -> Result<()> {
    let config = configure(Some(&args.countries), args.date.as_deref())?;
    let assembler = Assembler::new(Client::default(), config)?;

    let rows = assembler.load_long()?;
    let fmt = match args.format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => args
            .out
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("csv"),
    }
    .to_ascii_lowercase();
    if let Some(dir) = args.out.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    match fmt.as_str() {
        "csv" => storage::save_long_csv(&rows, &args.out)?,
        "json" => storage::save_long_json(&rows, &args.out)?,
        other => anyhow::bail!("unsupported format: {}", other),
    }
    eprintln!("Saved: {} (rows={})", args.out.display(), rows.len());
    Ok(())
}
