use anyhow::Context;
use clap::Parser;
use rakecore::analysis::{
    GridInterpolator, LogLoader, SuitabilityScorer, Survey, SurveyReport, TerrainClusterer,
};
use rakecore::prelude::{AnalysisConfig, AnalysisError};
use rakecore::Reading;
use serde::Deserialize;
use std::path::PathBuf;

use export::{ClusterSummary, SummaryDocument};

mod export;

#[derive(Parser)]
#[command(author, version, about = "Historical trail-survey analyzer")]
struct Args {
    /// Directory containing rake_log_*.csv session files
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,
    /// Load an analysis config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the IDW prediction grid to this CSV file
    #[arg(long)]
    grid: Option<PathBuf>,
    /// Write the cluster/score summary to this JSON file
    #[arg(long)]
    summary: Option<PathBuf>,
    /// Fetch and print the live state of a running logger (base URL)
    #[arg(long)]
    live: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(url) = &args.live {
        return print_live_state(url);
    }

    let config = if let Some(path) = &args.config {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading analysis config {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing analysis config {}", path.display()))?
    } else {
        AnalysisConfig::default()
    };

    let survey = LogLoader::new(&args.log_dir)
        .load()
        .context("loading session logs")?;
    if survey.skipped > 0 {
        log::warn!("{} row(s) skipped", survey.skipped);
    }

    let samples = survey.terrain_samples();
    match TerrainClusterer::new(config.clone()).cluster(&samples) {
        Ok(clusters) => {
            let scorer = SuitabilityScorer::new(survey.gas_bounds().unwrap_or((0.0, 0.0)));
            println!(
                "{}",
                SurveyReport::build(&survey, &clusters, &scorer, &config)
            );

            if let Some(path) = &args.grid {
                let predictions =
                    GridInterpolator::new(config.clone()).predict_grid(&samples, &clusters)?;
                export::write_predictions_csv(path, &predictions)?;
            }
            if let Some(path) = &args.summary {
                let summary = SummaryDocument {
                    readings: survey.readings.len(),
                    skipped: survey.skipped,
                    sessions: survey.sessions.len(),
                    clusters: clusters
                        .into_iter()
                        .map(|cluster| {
                            let scores = scorer.score_all(&cluster.centroid);
                            ClusterSummary { cluster, scores }
                        })
                        .collect(),
                };
                export::write_summary_json(path, &summary)?;
            }
        }
        Err(AnalysisError::InsufficientData(found, needed)) => {
            log::warn!(
                "terrain analysis skipped: {} complete sample(s), need {}",
                found,
                needed
            );
            println!("{}", SurveyReport::summary_only(&survey));
            report_export_skip(&args, &survey);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn report_export_skip(args: &Args, survey: &Survey) {
    if args.grid.is_some() || args.summary.is_some() {
        log::warn!(
            "exports skipped: {} readings lack the fields terrain analysis needs",
            survey.readings.len()
        );
    }
}

/// Subset of the logger bridge's model that matters on a terminal.
#[derive(Debug, Deserialize)]
struct LiveSnapshot {
    latest: Option<Reading>,
    rows_logged: u64,
    read_failures: u64,
}

fn print_live_state(base_url: &str) -> anyhow::Result<()> {
    let url = format!("{}/latest", base_url.trim_end_matches('/'));
    let snapshot: LiveSnapshot = reqwest::blocking::get(&url)
        .with_context(|| format!("fetching {}", url))?
        .json()
        .context("decoding live state")?;

    match &snapshot.latest {
        Some(reading) => {
            println!("latest reading at {}", reading.timestamp);
            println!("  temperature: {}", format_field(reading.temperature, "C"));
            println!("  humidity:    {}", format_field(reading.humidity, "%"));
            println!("  pressure:    {}", format_field(reading.pressure, "hPa"));
            println!("  gas:         {}", format_field(reading.gas, "ohm"));
            match (reading.latitude, reading.longitude) {
                (Some(lat), Some(lon)) => println!("  position:    {:.6}, {:.6}", lat, lon),
                _ => println!("  position:    no fix"),
            }
        }
        None => println!("logger is up, no reading published yet"),
    }
    println!(
        "rows logged: {}, read failures: {}",
        snapshot.rows_logged, snapshot.read_failures
    );
    Ok(())
}

fn format_field(value: Option<f32>, unit: &str) -> String {
    match value {
        Some(value) => format!("{:.2} {}", value, unit),
        None => "unknown".to_string(),
    }
}
