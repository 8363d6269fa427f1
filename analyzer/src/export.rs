use anyhow::Context;
use rakecore::analysis::{GridPrediction, SpeciesScore, TerrainCluster};
use serde::Serialize;
use std::path::Path;

/// Finished data tables handed to rendering collaborators (mapping and
/// plotting tools consume these; nothing here draws).

#[derive(Debug, Serialize)]
pub struct ClusterSummary {
    #[serde(flatten)]
    pub cluster: TerrainCluster,
    pub scores: Vec<SpeciesScore>,
}

#[derive(Debug, Serialize)]
pub struct SummaryDocument {
    pub readings: usize,
    pub skipped: usize,
    pub sessions: usize,
    pub clusters: Vec<ClusterSummary>,
}

pub fn write_predictions_csv<P: AsRef<Path>>(
    path: P,
    predictions: &[GridPrediction],
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating prediction table {}", path.display()))?;
    for prediction in predictions {
        writer.serialize(prediction)?;
    }
    writer.flush()?;
    log::info!(
        "wrote {} prediction row(s) to {}",
        predictions.len(),
        path.display()
    );
    Ok(())
}

pub fn write_summary_json<P: AsRef<Path>>(
    path: P,
    summary: &SummaryDocument,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let contents = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, contents)
        .with_context(|| format!("writing summary {}", path.display()))?;
    log::info!(
        "wrote summary for {} cluster(s) to {}",
        summary.clusters.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rakecore::analysis::{TerrainCentroid, TerrainCluster};
    use tempfile::TempDir;

    fn prediction() -> GridPrediction {
        GridPrediction {
            latitude: 37.8975,
            longitude: -122.2461,
            altitude: 255.0,
            humidity: 58.0,
            temperature: 18.0,
            gas: 40_000.0,
            terrain: "Grassland Slope".to_string(),
            confidence: 0.8,
        }
    }

    #[test]
    fn prediction_table_round_trips_through_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("predictions.csv");
        write_predictions_csv(&path, &[prediction(), prediction()]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert!(reader
            .headers()
            .unwrap()
            .iter()
            .any(|h| h == "terrain"));
    }

    #[test]
    fn summary_document_serializes_with_nested_scores() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.json");
        let summary = SummaryDocument {
            readings: 10,
            skipped: 1,
            sessions: 2,
            clusters: vec![ClusterSummary {
                cluster: TerrainCluster {
                    id: 0,
                    name: "Valley Floor".to_string(),
                    centroid: TerrainCentroid {
                        altitude: 240.0,
                        humidity: 65.0,
                        temperature: 17.0,
                        gas: 41_000.0,
                    },
                    members: 12,
                    confidence: 1.0,
                    altitude_range: (235.0, 245.0),
                    latitude_range: (37.89, 37.90),
                    longitude_range: (-122.25, -122.24),
                },
                scores: Vec::new(),
            }],
        };
        write_summary_json(&path, &summary).unwrap();

        let loaded: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded["clusters"][0]["name"], "Valley Floor");
        assert_eq!(loaded["readings"], 10);
    }
}
