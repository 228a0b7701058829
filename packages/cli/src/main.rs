#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the collision map dashboard.
//!
//! Loads the collision export and ZIP boundaries named by the config file
//! (or flags), then either serves the dashboard or prints one of its views.
//!
//! Uses `indicatif-log-bridge` (via [`collision_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the load progress bar never fight for the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use collision_map_aggregate::{AggregateTable, ProgressCallback, load_aggregates};
use collision_map_cli_utils::IndicatifProgress;
use collision_map_collision_models::{Metric, Variant, ZipNormalization};
use collision_map_geography::{BoundarySet, reconcile};
use collision_map_server::config::DashboardConfig;
use collision_map_server::render::{format_metric_value, render_choropleth};
use collision_map_server::{AppState, run_server};

#[derive(Parser)]
#[command(name = "collision_map", about = "NYC collision choropleth dashboard")]
struct Cli {
    /// TOML config file; every key is optional
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    inputs: InputArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that override the corresponding config keys.
#[derive(Args, Default)]
struct InputArgs {
    /// Collision export CSV
    #[arg(long, global = true)]
    collisions: Option<PathBuf>,
    /// ZIP boundary `GeoJSON` `FeatureCollection`
    #[arg(long, global = true)]
    boundaries: Option<PathBuf>,
    /// Metric set to offer (`base` or `extended`)
    #[arg(long, global = true)]
    variant: Option<Variant>,
    /// ZIP cleaning policy (`full`, `decimal-suffix` or `whitespace`)
    #[arg(long, global = true)]
    zip_normalization: Option<ZipNormalization>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard API and front-end
    Serve {
        /// Address to bind to
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the per-ZIP aggregate table and dataset summary
    Summary,
    /// List aggregated ZIP codes with no boundary polygon
    Reconcile,
    /// Print the choropleth for a metric as JSON, without geometry
    Render {
        /// Column name or selector label; defaults to the variant's default
        #[arg(long)]
        metric: Option<Metric>,
    },
}

impl InputArgs {
    fn apply(&self, mut config: DashboardConfig) -> DashboardConfig {
        if let Some(path) = &self.collisions {
            config.collisions_path.clone_from(path);
        }
        if let Some(path) = &self.boundaries {
            config.boundaries_path.clone_from(path);
        }
        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if let Some(policy) = self.zip_normalization {
            config.zip_normalization = policy;
        }
        config
    }
}

fn resolve_config(cli: &Cli) -> Result<DashboardConfig, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    Ok(apply_flags(cli, config.apply_env_overrides()))
}

/// Applies command-line flags on top of the file and environment settings.
fn apply_flags(cli: &Cli, config: DashboardConfig) -> DashboardConfig {
    let mut config = cli.inputs.apply(config);

    if let Commands::Serve { bind, port } = &cli.command {
        if let Some(bind) = bind {
            config.bind_addr.clone_from(bind);
        }
        if let Some(port) = port {
            config.port = *port;
        }
    }

    config
}

fn load_table(
    config: &DashboardConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<AggregateTable, Box<dyn std::error::Error>> {
    Ok(load_aggregates(
        &config.collisions_path,
        config.zip_normalization,
        progress,
    )?)
}

fn load_boundaries(config: &DashboardConfig) -> Result<BoundarySet, Box<dyn std::error::Error>> {
    Ok(BoundarySet::load(&config.boundaries_path, &config.zip_property)?)
}

fn print_summary(table: &AggregateTable) {
    let summary = table.summary();

    println!(
        "{:<8} {:>8} {:>10} {:>8} {:>10} {:>10}",
        "ZIP", "CRASHES", "INJURED", "KILLED", "AVG INJ", "AVG KILL"
    );
    println!("{}", "-".repeat(59));
    for row in table.rows() {
        let avg = |metric| {
            row.metric_value(metric)
                .map_or_else(|| "-".to_string(), |v| format_metric_value(metric, v))
        };
        println!(
            "{:<8} {:>8} {:>10} {:>8} {:>10} {:>10}",
            row.zip_code,
            row.total_crashes,
            row.counts.persons_injured,
            row.counts.persons_killed,
            avg(Metric::AvgPersonsInjuredPerCrash),
            avg(Metric::AvgPersonsKilledPerCrash),
        );
    }

    println!();
    println!("Records read:        {}", summary.records_read);
    println!("Records without ZIP: {}", summary.records_without_zip);
    println!("ZIP codes:           {}", summary.zip_codes);
    if let (Some(first), Some(last)) = (summary.first_crash_date, summary.last_crash_date) {
        println!("Crash dates:         {first} to {last}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = collision_map_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let progress = IndicatifProgress::bytes_bar(&multi, "Loading collisions");

    match cli.command {
        Commands::Serve { .. } => {
            let state = AppState::load(&config, &progress)?;
            actix_web::rt::System::new().block_on(run_server(&config, state))?;
        }
        Commands::Summary => {
            let table = load_table(&config, &progress)?;
            print_summary(&table);
        }
        Commands::Reconcile => {
            let table = load_table(&config, &progress)?;
            let boundaries = load_boundaries(&config)?;
            let unmatched = reconcile(&table, &boundaries);

            println!("{:<8} CRASHES", "ZIP");
            println!("{}", "-".repeat(20));
            for zip in &unmatched {
                println!("{:<8} {}", zip.zip_code, zip.total_crashes);
            }
            log::info!(
                "{} of {} ZIP codes have no boundary polygon",
                unmatched.len(),
                table.len()
            );
        }
        Commands::Render { metric } => {
            let table = load_table(&config, &progress)?;
            let boundaries = load_boundaries(&config)?;
            let metric = metric.unwrap_or_else(|| config.variant.default_metric());

            let mut spec = render_choropleth(metric, &table, &boundaries, config.variant)?;
            spec.geojson = None;
            println!("{}", serde_json::to_string_pretty(&spec)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("collision_map").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn parses_render_metric_by_label() {
        let cli = parse(&["render", "--metric", "PERSONS KILLED"]);
        assert!(matches!(
            cli.command,
            Commands::Render {
                metric: Some(Metric::PersonsKilled)
            }
        ));
    }

    #[test]
    fn rejects_unknown_metric_and_variant() {
        let args = ["collision_map", "render", "--metric", "BOGUS"];
        assert!(Cli::try_parse_from(args).is_err());
        let args = ["collision_map", "summary", "--variant", "deluxe"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn input_flags_override_config() {
        let cli = parse(&[
            "summary",
            "--collisions",
            "crashes.csv",
            "--variant",
            "base",
            "--zip-normalization",
            "decimal-suffix",
        ]);
        let config = cli.inputs.apply(DashboardConfig::default());

        assert_eq!(config.collisions_path, PathBuf::from("crashes.csv"));
        assert_eq!(
            config.boundaries_path,
            DashboardConfig::default().boundaries_path
        );
        assert_eq!(config.variant, Variant::Base);
        assert_eq!(config.zip_normalization, ZipNormalization::DecimalSuffix);
    }

    #[test]
    fn serve_flags_set_bind_address_and_port() {
        let cli = parse(&["serve", "--bind", "0.0.0.0", "--port", "9000"]);
        let config = apply_flags(&cli, DashboardConfig::default().apply_overrides(|_| None));
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn serve_flags_win_over_environment() {
        let from_env = DashboardConfig::default().apply_overrides(|key| match key {
            "BIND_ADDR" => Some("10.0.0.1".to_string()),
            "PORT" => Some("7000".to_string()),
            _ => None,
        });

        let config = apply_flags(&parse(&["serve", "--port", "9000"]), from_env.clone());
        assert_eq!(config.bind_addr, "10.0.0.1");
        assert_eq!(config.port, 9000);

        let config = apply_flags(&parse(&["summary"]), from_env);
        assert_eq!(config.port, 7000);
    }
}
