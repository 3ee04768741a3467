use std::io::{self, Read};
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use checkin_evolution::config::{Config, ConfigOverrides};
use checkin_evolution::evolution::history::{
    build_timeline, cumulative_change, locate, TimelineEntry,
};
use checkin_evolution::evolution::summary::summarize_report;
use checkin_evolution::evolution::{compute_evolution, EvolutionReport, MetricKey};
use checkin_evolution::ingest::{load_baseline, load_client_record};
use checkin_evolution::measurements::{extract, MeasurementPair};
use checkin_evolution::output::csv::{evolution_to_csv, pairs_to_csv, timeline_to_csv};
use checkin_evolution::output::json::{render_json, render_json_lines};
use checkin_evolution::output::table::{
    render_evolution_table, render_pairs_table, render_timeline_table,
};
use checkin_evolution::server::run_server;
use checkin_evolution::types::ClientRecord;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "checkin-evolution",
    about = "Measurement extraction and progress tracking for coaching check-ins"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Check-in export (.json or .csv)
    #[arg(long)]
    checkins: Option<PathBuf>,
    /// Baseline JSON, replaces any baseline embedded in the export
    #[arg(long)]
    baseline: Option<PathBuf>,
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Pull waist and hip values out of free text; reads stdin lines when no text is given
    Extract { texts: Vec<String> },
    /// Compare one check-in (the latest by default) with the one before it
    Evolution {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Timeline,
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        checkins_path: cli.checkins.clone(),
        baseline_path: cli.baseline.clone(),
    });
    init_tracing(&config);

    let format = match cli.output {
        Some(format) => format,
        None => OutputFormat::from_str(&config.report.default_format, true)
            .map_err(|e| anyhow!("invalid [report] default_format: {e}"))?,
    };

    match &cli.command {
        Commands::Config { init, show } => {
            if *init {
                Config::write_template(&config_path)?;
                println!("Wrote config template to {}", config_path.display());
            }
            if *show || !*init {
                println!("{}", render_json(&config)?);
            }
        }
        Commands::Serve { host, port } => {
            let host = host.clone().unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let bind = format!("{host}:{port}");
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            return run_server(config, addr).await;
        }
        Commands::Extract { texts } => {
            let texts = if texts.is_empty() {
                read_stdin_lines()?
            } else {
                texts.clone()
            };
            let rows: Vec<(String, MeasurementPair)> = texts
                .into_iter()
                .map(|text| {
                    let pair = extract(&text);
                    (text, pair)
                })
                .collect();
            print_pairs(&rows, format)?;
        }
        Commands::Evolution { date } => {
            let record = load_record(&config)?;
            let (current, previous) = locate(&record.checkins, *date).ok_or_else(|| match date {
                Some(date) => anyhow!("no check-in dated {date}"),
                None => anyhow!("no check-ins to report on"),
            })?;
            if previous.is_none() && record.baseline.is_none() {
                info!("first check-in without a baseline, nothing to compare against");
            }
            let report = compute_evolution(current, previous, record.baseline.as_ref());
            print_evolution(&report, format)?;
        }
        Commands::Timeline => {
            let record = load_record(&config)?;
            let timeline = build_timeline(&record.checkins, record.baseline.as_ref());
            print_timeline(&timeline, format)?;
        }
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_stdin_lines() -> Result<Vec<String>> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed reading measurement text from stdin")?;
    Ok(input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn load_record(config: &Config) -> Result<ClientRecord> {
    let path = config.resolved_checkins_path().ok_or_else(|| {
        anyhow!("no check-in export configured, pass --checkins or set [input] checkins_path")
    })?;
    let mut record = load_client_record(&path)?;
    if let Some(baseline_path) = config.resolved_baseline_path() {
        if record.baseline.is_some() {
            warn!(
                "baseline in {} replaced by {}",
                path.display(),
                baseline_path.display()
            );
        }
        record.baseline = Some(load_baseline(&baseline_path)?);
    }
    Ok(record)
}

fn print_pairs(rows: &[(String, MeasurementPair)], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_pairs_table(rows)),
        OutputFormat::Json => {
            let pairs: Vec<MeasurementPair> = rows.iter().map(|(_, pair)| *pair).collect();
            match pairs.as_slice() {
                [single] => println!("{}", render_json(single)?),
                _ => println!("{}", render_json_lines(&pairs)?),
            }
        }
        OutputFormat::Csv => print!("{}", pairs_to_csv(rows)?),
    }
    Ok(())
}

fn print_evolution(report: &EvolutionReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", render_evolution_table(report));
            println!("{}", summarize_report(report));
        }
        OutputFormat::Json => println!("{}", render_json(report)?),
        OutputFormat::Csv => print!("{}", evolution_to_csv(report)?),
    }
    Ok(())
}

fn print_timeline(timeline: &[TimelineEntry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", render_timeline_table(timeline));
            for key in [MetricKey::Weight, MetricKey::Waist, MetricKey::Hip] {
                if let Some(change) = cumulative_change(timeline, key) {
                    println!("{key} overall: {change:+.1} {}", key.unit());
                }
            }
        }
        OutputFormat::Json => println!("{}", render_json(timeline)?),
        OutputFormat::Csv => print!("{}", timeline_to_csv(timeline)?),
    }
    Ok(())
}
