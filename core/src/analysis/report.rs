use crate::analysis::cluster::TerrainCluster;
use crate::analysis::loader::Survey;
use crate::analysis::suitability::SuitabilityScorer;
use crate::math::stats::StatsHelper;
use crate::prelude::AnalysisConfig;
use crate::reading::{NutrientAffinity, Reading, NATIVE_SPECIES};
use std::fmt::Write;

/// Plain-text summary of a survey: dataset statistics, terrain profiles,
/// species dispersal recommendations, and the humidity trend against
/// earlier sessions. Rendering (maps, graphs) is a downstream concern;
/// this report and the exported tables are the hand-off.
pub struct SurveyReport;

impl SurveyReport {
    pub fn build(
        survey: &Survey,
        clusters: &[TerrainCluster],
        scorer: &SuitabilityScorer,
        config: &AnalysisConfig,
    ) -> String {
        let mut out = String::new();
        dataset_section(&mut out, survey);
        terrain_section(&mut out, clusters);
        species_section(&mut out, clusters, scorer, config);
        gradient_section(&mut out, survey);
        trend_section(&mut out, survey);
        out
    }

    /// Fallback report when too few complete samples exist for terrain
    /// analysis; statistics and trend still apply.
    pub fn summary_only(survey: &Survey) -> String {
        let mut out = String::new();
        dataset_section(&mut out, survey);
        trend_section(&mut out, survey);
        out.push_str("\nToo few complete samples for terrain analysis.\n");
        out.push_str("Clustering needs rows with GPS fix, humidity, temperature and gas.\n");
        out
    }
}

fn dataset_section(out: &mut String, survey: &Survey) {
    let _ = writeln!(out, "=== SURVEY SUMMARY ===");
    let _ = writeln!(
        out,
        "{} readings across {} session file(s), {} malformed row(s) skipped",
        survey.readings.len(),
        survey.sessions.len(),
        survey.skipped
    );
    if let (Some(first), Some(last)) = (survey.readings.first(), survey.readings.last()) {
        let _ = writeln!(out, "time range: {} .. {}", first.timestamp, last.timestamp);
        if let (Some(start), Some(end)) = (first.parsed_timestamp(), last.parsed_timestamp()) {
            let _ = writeln!(out, "duration: {} minute(s)", (end - start).num_minutes());
        }
    }
    for session in &survey.sessions {
        let _ = writeln!(out, "  {} ({} rows)", session.file, session.rows);
    }

    field_line(out, "temperature (C)", survey, |r| r.temperature);
    field_line(out, "humidity (%)", survey, |r| r.humidity);
    field_line(out, "pressure (hPa)", survey, |r| r.pressure);
    field_line(out, "gas (ohm)", survey, |r| r.gas);
    field_line(out, "altitude (m)", survey, |r| r.altitude);

    let fixes = survey
        .readings
        .iter()
        .filter(|r| r.latitude.is_some() && r.longitude.is_some())
        .count();
    let _ = writeln!(
        out,
        "gps fixes: {} of {} readings",
        fixes,
        survey.readings.len()
    );
}

fn field_line(
    out: &mut String,
    label: &str,
    survey: &Survey,
    extract: impl Fn(&Reading) -> Option<f32>,
) {
    let values: Vec<f32> = survey.readings.iter().filter_map(&extract).collect();
    match StatsHelper::min_max(&values) {
        Some((lo, hi)) => {
            let _ = writeln!(
                out,
                "  {:<16} mean {:>9.2}  min {:>9.2}  max {:>9.2}  ({} known)",
                label,
                StatsHelper::mean(&values),
                lo,
                hi,
                values.len()
            );
        }
        None => {
            let _ = writeln!(out, "  {:<16} no known values", label);
        }
    }
}

fn terrain_section(out: &mut String, clusters: &[TerrainCluster]) {
    let _ = writeln!(out, "\n=== TERRAIN MICROCLIMATES ===");
    let _ = writeln!(out, "{} distinct microclimate(s) identified", clusters.len());
    for cluster in clusters {
        let _ = writeln!(
            out,
            "\n--- {} ({:.0}m elevation) ---",
            cluster.name, cluster.centroid.altitude
        );
        let _ = writeln!(out, "  points sampled: {}", cluster.members);
        let _ = writeln!(out, "  humidity: {:.1}%", cluster.centroid.humidity);
        let _ = writeln!(out, "  temperature: {:.1}C", cluster.centroid.temperature);
        let _ = writeln!(out, "  soil activity (gas): {:.0} ohm", cluster.centroid.gas);
        if cluster.confidence < 1.0 {
            let _ = writeln!(
                out,
                "  confidence: {:.0}% (thin sample coverage)",
                cluster.confidence * 100.0
            );
        }
    }
}

fn species_section(
    out: &mut String,
    clusters: &[TerrainCluster],
    scorer: &SuitabilityScorer,
    config: &AnalysisConfig,
) {
    let _ = writeln!(out, "\n=== NATIVE FORAGE DISPERSAL PLAN ===");
    for profile in &NATIVE_SPECIES {
        let _ = writeln!(out, "\n{} ({})", profile.name, profile.scientific);
        let _ = writeln!(out, "  {}", profile.description);

        let mut ranked: Vec<(&TerrainCluster, f32)> = clusters
            .iter()
            .map(|cluster| {
                (
                    cluster,
                    scorer.score_species(profile, &cluster.centroid).score,
                )
            })
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut recommended = false;
        for (cluster, score) in &ranked {
            let marker = if *score >= config.score_recommend_threshold {
                recommended = true;
                "DISPERSE"
            } else {
                "skip"
            };
            let _ = writeln!(
                out,
                "  {:<24} score {:>5.1}  confidence {:>3.0}%  -> {}",
                cluster.name,
                score,
                cluster.confidence * 100.0,
                marker
            );
        }
        if !recommended {
            let _ = writeln!(out, "  no surveyed microclimate suits this species");
        }

        let advice = match profile.nutrient_affinity {
            NutrientAffinity::High => "favor cattle-trafficked ground; manure boosts establishment",
            NutrientAffinity::Low => "avoid manure-rich ground; prefers lean soils",
            NutrientAffinity::Moderate => "tolerant of nutrient variation across the range",
        };
        let _ = writeln!(out, "  note: {}", advice);
    }
}

fn gradient_section(out: &mut String, survey: &Survey) {
    let altitudes: Vec<f32> = survey.readings.iter().filter_map(|r| r.altitude).collect();
    let Some((lo, hi)) = StatsHelper::min_max(&altitudes) else {
        return;
    };

    let _ = writeln!(out, "\n=== LANDSCAPE STRATEGY ===");
    let _ = writeln!(out, "vertical gradient: {:.0}m elevation change", hi - lo);
    if hi - lo > 100.0 {
        let _ = writeln!(out, "steep terrain detected:");
        let _ = writeln!(out, "  upper zones: browse plants for goats and sheep");
        let _ = writeln!(out, "  mid slopes: mixed grasses for cattle");
        let _ = writeln!(out, "  lower zones: deep-rooted plants for water retention");
    } else {
        let _ = writeln!(out, "gentle terrain detected:");
        let _ = writeln!(out, "  uniform seeding strategy appropriate");
        let _ = writeln!(out, "  focus on soil building through managed grazing");
    }
}

fn trend_section(out: &mut String, survey: &Survey) {
    let with_humidity: Vec<(&str, f32)> = survey
        .sessions
        .iter()
        .filter_map(|s| s.mean_humidity.map(|h| (s.file.as_str(), h)))
        .collect();
    let Some(((_, current), history)) = with_humidity.split_last() else {
        return;
    };
    if history.is_empty() {
        return;
    }

    let historical: Vec<f32> = history.iter().map(|(_, h)| *h).collect();
    let change = current - StatsHelper::mean(&historical);

    let _ = writeln!(out, "\n=== HISTORICAL PATTERN ===");
    let _ = writeln!(
        out,
        "comparing latest session to {} previous session(s)",
        history.len()
    );
    if change.abs() > 5.0 {
        let direction = if change > 0.0 { "WETTER" } else { "DRIER" };
        let _ = writeln!(
            out,
            "trend: landscape is {:+.1}% {} than the historical average",
            change, direction
        );
        let advice = if change > 0.0 {
            "reduce seeding in low-lying areas"
        } else {
            "focus seeding near water sources"
        };
        let _ = writeln!(out, "adaptation: {}", advice);
    } else {
        let _ = writeln!(out, "conditions stable, historical patterns holding");
    }
}
