//! Command line interface and subcommand drivers

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{
    parse_time_zone, CalendarConfig, CometConfig, IcsConfig, MilkyWayConfig, StargazeConfig,
    DEFAULT_CONFIG_PATH,
};
use crate::model::catalog::{load_comet_catalog, CatalogSource};
use crate::module::calendar::{load_windows, sample_windows, CalendarRenderer};
use crate::module::comet::{format_summary, sort_reports, write_json_report, CometFinder};
use crate::module::ics::{build_schedule, export_rows, parse_calendar};
use crate::module::json::write_json_file;
use crate::module::milkyway::{format_listing, MilkyWayScanner};

#[derive(Debug, Parser)]
#[command(name = "stargaze", version, about = "Astrophotography planning tools")]
pub struct Cli {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override the configured log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find comets bright and high enough to photograph, month by month
    Comets(CometArgs),
    /// Compute nightly Milky Way core windows for a year
    Milkyway(MilkyWayArgs),
    /// Render a bar-chart calendar of nightly windows
    Calendar(CalendarArgs),
    /// Convert an ICS calendar into a spreadsheet
    Ics(IcsArgs),
}

#[derive(Debug, Args)]
pub struct CometArgs {
    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub start_month: Option<u32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub end_month: Option<u32>,

    /// Faintest magnitude to keep
    #[arg(long)]
    pub max_magnitude: Option<f64>,

    /// Use a local CometEls.txt instead of downloading
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Directory for the JSON report
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Do not write the JSON report
    #[arg(long)]
    pub no_json: bool,
}

#[derive(Debug, Args)]
pub struct MilkyWayArgs {
    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<f64>,

    /// JSON dataset to write
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CalendarArgs {
    /// JSON dataset; the built-in October 2026 sample is used when omitted
    #[arg(long)]
    pub input: Option<PathBuf>,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub background: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct IcsArgs {
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// `.xlsx` or `.csv`
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// IANA zone for the output times
    #[arg(long)]
    pub timezone: Option<String>,
}

impl Cli {
    /// Apply command-line overrides on top of the file configuration.
    pub fn apply_overrides(&self, config: &mut StargazeConfig) {
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }

        match &self.command {
            Command::Comets(args) => {
                let c = &mut config.comet;
                if let Some(year) = args.year {
                    c.year = year;
                }
                if let Some(month) = args.start_month {
                    c.start_month = month;
                }
                if let Some(month) = args.end_month {
                    c.end_month = month;
                }
                if let Some(magnitude) = args.max_magnitude {
                    c.max_magnitude = magnitude;
                }
                if let Some(catalog) = &args.catalog {
                    c.catalog_path = Some(catalog.clone());
                }
                if let Some(dir) = &args.output_dir {
                    c.output_dir = dir.clone();
                }
                if args.no_json {
                    c.save_json = false;
                }
            }
            Command::Milkyway(args) => {
                let m = &mut config.milkyway;
                if let Some(year) = args.year {
                    m.year = year;
                }
                if let Some(latitude) = args.latitude {
                    m.observer.latitude = latitude;
                }
                if let Some(longitude) = args.longitude {
                    m.observer.longitude = longitude;
                }
                if let Some(output) = &args.output {
                    m.output_json = Some(output.clone());
                }
            }
            Command::Calendar(args) => {
                let c = &mut config.calendar;
                if let Some(input) = &args.input {
                    c.input_json = Some(input.clone());
                }
                if let Some(output) = &args.output {
                    c.output_png = output.clone();
                }
                if let Some(background) = &args.background {
                    c.background_image = background.clone();
                }
            }
            Command::Ics(args) => {
                let i = &mut config.ics;
                if let Some(input) = &args.input {
                    i.input = input.clone();
                }
                if let Some(output) = &args.output {
                    i.output = output.clone();
                }
                if let Some(tz) = &args.timezone {
                    i.timezone = tz.clone();
                }
            }
        }
    }
}

/// Dispatch one subcommand.
pub async fn run(command: &Command, config: &StargazeConfig) -> Result<()> {
    match command {
        Command::Comets(_) => run_comets(&config.comet, &config.data_dir).await,
        Command::Milkyway(_) => run_milkyway(&config.milkyway).await.map(|_| ()),
        Command::Calendar(_) => run_calendar(&config.calendar).await.map(|_| ()),
        Command::Ics(_) => run_ics(&config.ics).await.map(|_| ()),
    }
}

fn display_path(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

pub async fn run_comets(config: &CometConfig, data_dir: &Path) -> Result<()> {
    println!(
        "Comet search {} (months {}-{})",
        config.year, config.start_month, config.end_month
    );

    let source = match &config.catalog_path {
        Some(path) => CatalogSource::Local(path.clone()),
        None => CatalogSource::mpc(data_dir),
    };
    let comets = load_comet_catalog(&source).await?;

    let search_config = config.clone();
    let mut reports = tokio::task::spawn_blocking(move || {
        CometFinder::new(&search_config).map(|finder| finder.search(&comets))
    })
    .await
    .context("Comet search task failed")??;

    sort_reports(&mut reports);
    print!(
        "{}",
        format_summary(&reports, config.year, config.start_month, config.end_month)
    );

    if config.save_json && !reports.is_empty() {
        let path = write_json_report(&reports, &config.output_dir, &config.json_file_name()).await?;
        println!("\nSaved JSON report: {}", display_path(&path));
    }
    Ok(())
}

pub async fn run_milkyway(config: &MilkyWayConfig) -> Result<PathBuf> {
    println!(
        "Computing {} for {}, {}...",
        config.year, config.observer.latitude, config.observer.longitude
    );

    let scan_config = config.clone();
    let windows = tokio::task::spawn_blocking(move || MilkyWayScanner::new(&scan_config)?.scan_year())
        .await
        .context("Milky Way scan task failed")??;

    println!("{}", format_listing(&windows));

    let path = config.output_path();
    write_json_file(&windows, &path).await?;
    println!("Saved {} nights to {}", windows.len(), display_path(&path));
    Ok(path)
}

pub async fn run_calendar(config: &CalendarConfig) -> Result<PathBuf> {
    let windows = match &config.input_json {
        Some(path) => load_windows(path).await?,
        None => {
            tracing::info!("No dataset given, using the October 2026 sample");
            sample_windows()
        }
    };

    let path = CalendarRenderer::new(config)
        .render(&windows, &config.output_png)
        .await?;
    println!("Graph saved to {}", path.display());
    Ok(path)
}

/// Returns the number of rows written.
pub async fn run_ics(config: &IcsConfig) -> Result<usize> {
    let tz = parse_time_zone(&config.timezone)?;

    if !tokio::fs::try_exists(&config.input).await.unwrap_or(false) {
        anyhow::bail!("File not found: {}", config.input.display());
    }
    let bytes = tokio::fs::read(&config.input)
        .await
        .with_context(|| format!("Failed to read {}", config.input.display()))?;
    let text = String::from_utf8_lossy(&bytes);

    let events = parse_calendar(&text)
        .with_context(|| format!("Failed to parse {}", config.input.display()))?;
    let rows = build_schedule(&events, &tz);
    if rows.is_empty() {
        println!("No events found in {}", config.input.display());
        return Ok(0);
    }

    export_rows(&rows, &config.output)?;
    println!("Created spreadsheet: {}", config.output.display());
    println!("Total rows: {}", rows.len());
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comet_overrides() {
        let cli = Cli::parse_from([
            "stargaze",
            "--log-level",
            "debug",
            "comets",
            "--year",
            "2027",
            "--start-month",
            "2",
            "--end-month",
            "4",
            "--no-json",
        ]);
        let mut config = StargazeConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.comet.year, 2027);
        assert_eq!(config.comet.start_month, 2);
        assert_eq!(config.comet.end_month, 4);
        assert!(!config.comet.save_json);
        assert_eq!(config.comet.max_magnitude, 12.0);
    }

    #[test]
    fn test_month_range_checked() {
        assert!(Cli::try_parse_from(["stargaze", "comets", "--start-month", "13"]).is_err());
    }

    #[test]
    fn test_milkyway_negative_coordinates() {
        let cli = Cli::parse_from(["stargaze", "milkyway", "--latitude", "-33.9", "--longitude", "18.4"]);
        let mut config = StargazeConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.milkyway.observer.latitude, -33.9);
        assert_eq!(config.milkyway.observer.longitude, 18.4);
    }

    #[tokio::test]
    async fn test_ics_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = IcsConfig {
            input:  dir.path().join("missing.ics"),
            output: dir.path().join("out.csv"),
            ..IcsConfig::default()
        };
        assert!(run_ics(&config).await.is_err());
        assert!(!config.output.exists());
    }
}
