use crate::math::stats::StatsHelper;
use crate::prelude::{AnalysisConfig, AnalysisError, AnalysisResult};
use crate::reading::TerrainSample;
use crate::telemetry::log::LogManager;
use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::Array2;
use serde::Serialize;

/// Mean field values of one microclimate cluster.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TerrainCentroid {
    pub altitude: f32,
    pub humidity: f32,
    pub temperature: f32,
    pub gas: f32,
}

/// One microclimate partition of the surveyed landscape. Derived fresh on
/// each analysis run, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct TerrainCluster {
    pub id: usize,
    pub name: String,
    pub centroid: TerrainCentroid,
    pub members: usize,
    /// In [0, 1]; proportionally reduced below the minimum sample count.
    pub confidence: f32,
    pub altitude_range: (f32, f32),
    pub latitude_range: (f64, f64),
    pub longitude_range: (f64, f64),
}

/// Partitions samples into microclimates with k-means over standardized
/// altitude/humidity/temperature/gas features.
pub struct TerrainClusterer {
    config: AnalysisConfig,
    logger: LogManager,
}

impl TerrainClusterer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            logger: LogManager::new(),
        }
    }

    pub fn cluster(&self, samples: &[TerrainSample]) -> AnalysisResult<Vec<TerrainCluster>> {
        if samples.len() < 2 {
            return Err(AnalysisError::InsufficientData(samples.len(), 2));
        }

        let k = (samples.len() / self.config.samples_per_cluster.max(1))
            .clamp(2, self.config.max_clusters.max(2))
            .min(samples.len());

        let features = standardize(feature_matrix(samples));
        let dataset = DatasetBase::from(features);
        let model = KMeans::params(k)
            .max_n_iterations(self.config.kmeans_max_iterations)
            .tolerance(1e-4)
            .fit(&dataset)
            .map_err(|e| AnalysisError::Clustering(e.to_string()))?;
        let assigned = model.predict(dataset);

        let mut clusters = Vec::new();
        for cluster_id in 0..k {
            let members: Vec<&TerrainSample> = assigned
                .targets()
                .iter()
                .zip(samples)
                .filter(|(&label, _)| label == cluster_id)
                .map(|(_, sample)| sample)
                .collect();
            if members.is_empty() {
                continue;
            }
            clusters.push(self.build_cluster(&members));
        }

        // Present clusters lowest terrain first, like a walk up the trail.
        clusters.sort_by(|a, b| {
            a.centroid
                .altitude
                .partial_cmp(&b.centroid.altitude)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (id, cluster) in clusters.iter_mut().enumerate() {
            cluster.id = id;
        }

        self.logger.record(&format!(
            "identified {} terrain cluster(s) from {} samples",
            clusters.len(),
            samples.len()
        ));
        Ok(clusters)
    }

    fn build_cluster(&self, members: &[&TerrainSample]) -> TerrainCluster {
        let altitudes: Vec<f32> = members.iter().map(|s| s.altitude).collect();
        let humidity: Vec<f32> = members.iter().map(|s| s.humidity).collect();
        let temperature: Vec<f32> = members.iter().map(|s| s.temperature).collect();
        let gas: Vec<f32> = members.iter().map(|s| s.gas).collect();

        let centroid = TerrainCentroid {
            altitude: StatsHelper::mean(&altitudes),
            humidity: StatsHelper::mean(&humidity),
            temperature: StatsHelper::mean(&temperature),
            gas: StatsHelper::mean(&gas),
        };

        let lat_range = fold_range_f64(members.iter().map(|s| s.latitude));
        let lon_range = fold_range_f64(members.iter().map(|s| s.longitude));

        TerrainCluster {
            id: 0,
            name: terrain_name(centroid.altitude, centroid.humidity, &self.config),
            centroid,
            members: members.len(),
            confidence: cluster_confidence(members.len(), self.config.min_cluster_samples),
            altitude_range: StatsHelper::min_max(&altitudes).unwrap_or((0.0, 0.0)),
            latitude_range: lat_range,
            longitude_range: lon_range,
        }
    }
}

/// Confidence grows linearly with member count up to the minimum sample
/// threshold; thin clusters are kept but flagged, not discarded.
pub fn cluster_confidence(members: usize, min_samples: usize) -> f32 {
    if min_samples == 0 {
        return 1.0;
    }
    (members as f32 / min_samples as f32).min(1.0)
}

/// Names a microclimate from its altitude band and humidity. Bands are
/// `band_width_m` wide starting at `band_base_m`; the wetter side of each
/// band reads as forested or riparian ground.
pub fn terrain_name(altitude: f32, humidity: f32, config: &AnalysisConfig) -> String {
    let band = if altitude < config.band_base_m {
        0
    } else {
        (1 + ((altitude - config.band_base_m) / config.band_width_m) as usize).min(3)
    };

    let name = match band {
        0 => {
            if humidity > 70.0 {
                "Riparian Zone"
            } else {
                "Valley Floor"
            }
        }
        1 => {
            if humidity > 65.0 {
                "Moist Forest Slope"
            } else {
                "Grassland Slope"
            }
        }
        2 => {
            if humidity > 60.0 {
                "Mixed Forest Mid-Slope"
            } else {
                "Oak Savanna"
            }
        }
        _ => {
            if humidity > 55.0 {
                "Upper Forest"
            } else {
                "Exposed Ridgeline"
            }
        }
    };
    name.to_string()
}

fn feature_matrix(samples: &[TerrainSample]) -> Array2<f64> {
    let mut features = Array2::zeros((samples.len(), 4));
    for (row, sample) in samples.iter().enumerate() {
        features[[row, 0]] = sample.altitude as f64;
        features[[row, 1]] = sample.humidity as f64;
        features[[row, 2]] = sample.temperature as f64;
        features[[row, 3]] = sample.gas as f64;
    }
    features
}

/// Column-wise z-scoring so gas resistance (tens of kΩ) does not drown the
/// other features. Constant columns stay at zero.
fn standardize(mut features: Array2<f64>) -> Array2<f64> {
    let rows = features.nrows() as f64;
    for mut column in features.columns_mut() {
        let mean = column.sum() / rows;
        let var = column.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / rows;
        let std = var.sqrt();
        for value in column.iter_mut() {
            *value = if std > 0.0 { (*value - mean) / std } else { 0.0 };
        }
    }
    features
}

fn fold_range_f64(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(altitude: f32, humidity: f32, temperature: f32, gas: f32) -> TerrainSample {
        TerrainSample {
            latitude: 37.8975 + altitude as f64 * 1e-5,
            longitude: -122.2461,
            altitude,
            humidity,
            temperature,
            gas,
        }
    }

    fn two_band_samples() -> Vec<TerrainSample> {
        let mut samples = Vec::new();
        for i in 0..12 {
            let jitter = (i % 3) as f32;
            samples.push(sample(230.0 + jitter, 72.0 + jitter, 17.0, 30_000.0));
            samples.push(sample(380.0 + jitter, 48.0 - jitter, 21.0, 45_000.0));
        }
        samples
    }

    #[test]
    fn separates_valley_and_ridge_samples() {
        let clusterer = TerrainClusterer::new(AnalysisConfig::default());
        let clusters = clusterer.cluster(&two_band_samples()).unwrap();

        assert!(clusters.len() >= 2);
        assert!(clusters[0].centroid.altitude < clusters.last().unwrap().centroid.altitude);
        let low = &clusters[0];
        assert!(low.centroid.altitude < 300.0);
        assert!(low.members >= 10);
        assert_eq!(low.confidence, 1.0);
    }

    #[test]
    fn too_few_samples_is_an_error_not_a_panic() {
        let clusterer = TerrainClusterer::new(AnalysisConfig::default());
        let samples = [sample(250.0, 60.0, 18.0, 40_000.0)];
        assert!(matches!(
            clusterer.cluster(&samples),
            Err(AnalysisError::InsufficientData(1, 2))
        ));
    }

    #[test]
    fn thin_clusters_report_reduced_confidence() {
        assert!(cluster_confidence(3, 5) < cluster_confidence(5, 5));
        assert_eq!(cluster_confidence(3, 5), 0.6);
        assert_eq!(cluster_confidence(8, 5), 1.0);
    }

    #[test]
    fn terrain_names_follow_altitude_bands() {
        let cfg = AnalysisConfig::default();
        assert_eq!(terrain_name(230.0, 75.0, &cfg), "Riparian Zone");
        assert_eq!(terrain_name(230.0, 55.0, &cfg), "Valley Floor");
        assert_eq!(terrain_name(270.0, 68.0, &cfg), "Moist Forest Slope");
        assert_eq!(terrain_name(270.0, 50.0, &cfg), "Grassland Slope");
        assert_eq!(terrain_name(320.0, 62.0, &cfg), "Mixed Forest Mid-Slope");
        assert_eq!(terrain_name(320.0, 50.0, &cfg), "Oak Savanna");
        assert_eq!(terrain_name(400.0, 58.0, &cfg), "Upper Forest");
        assert_eq!(terrain_name(400.0, 45.0, &cfg), "Exposed Ridgeline");
    }
}
