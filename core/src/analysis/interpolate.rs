use crate::analysis::cluster::{terrain_name, TerrainCluster};
use crate::math::geo::GeoHelper;
use crate::prelude::{AnalysisConfig, AnalysisError, AnalysisResult};
use crate::reading::TerrainSample;
use crate::telemetry::log::LogManager;
use serde::Serialize;

const IDW_EPSILON: f64 = 1e-9;

/// Predicted conditions for one unmapped grid cell.
#[derive(Debug, Clone, Serialize)]
pub struct GridPrediction {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f32,
    pub humidity: f32,
    pub temperature: f32,
    pub gas: f32,
    pub terrain: String,
    /// In (0, 1]; decays linearly with distance to the nearest sample.
    pub confidence: f32,
}

/// Extends surveyed conditions onto a regular grid with inverse-distance
/// weighting over the nearest samples.
pub struct GridInterpolator {
    config: AnalysisConfig,
    logger: LogManager,
}

impl GridInterpolator {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            logger: LogManager::new(),
        }
    }

    /// Predicts a grid over the surveyed bounds expanded by the configured
    /// margin. Cells farther than `max_snap_deg` from every sample are left
    /// unmapped rather than extrapolated into the unknown.
    pub fn predict_grid(
        &self,
        samples: &[TerrainSample],
        clusters: &[TerrainCluster],
    ) -> AnalysisResult<Vec<GridPrediction>> {
        if samples.is_empty() {
            return Err(AnalysisError::InsufficientData(0, 1));
        }

        let (lat_min, lat_max) = expand_bounds(
            fold_range(samples.iter().map(|s| s.latitude)),
            self.config.grid_margin,
        );
        let (lon_min, lon_max) = expand_bounds(
            fold_range(samples.iter().map(|s| s.longitude)),
            self.config.grid_margin,
        );

        let resolution = self.config.grid_resolution.max(2);
        let mut predictions = Vec::new();
        let mut unmapped = 0usize;

        for lat_step in 0..resolution {
            let latitude = lerp(lat_min, lat_max, lat_step as f64 / (resolution - 1) as f64);
            for lon_step in 0..resolution {
                let longitude =
                    lerp(lon_min, lon_max, lon_step as f64 / (resolution - 1) as f64);
                match self.predict_cell(latitude, longitude, samples, clusters) {
                    Some(prediction) => predictions.push(prediction),
                    None => unmapped += 1,
                }
            }
        }

        self.logger.record(&format!(
            "predicted {} grid cell(s), {} left unmapped",
            predictions.len(),
            unmapped
        ));
        Ok(predictions)
    }

    fn predict_cell(
        &self,
        latitude: f64,
        longitude: f64,
        samples: &[TerrainSample],
        clusters: &[TerrainCluster],
    ) -> Option<GridPrediction> {
        let mut neighbors: Vec<(f64, &TerrainSample)> = samples
            .iter()
            .map(|sample| {
                (
                    GeoHelper::planar_distance_deg(
                        latitude,
                        longitude,
                        sample.latitude,
                        sample.longitude,
                    ),
                    sample,
                )
            })
            .collect();
        neighbors.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        neighbors.truncate(self.config.idw_neighbors.max(1));

        let nearest = neighbors.first()?.0;
        if nearest > self.config.max_snap_deg {
            return None;
        }

        let mut total_weight = 0.0;
        let mut altitude = 0.0;
        let mut humidity = 0.0;
        let mut temperature = 0.0;
        let mut gas = 0.0;
        for (distance, sample) in &neighbors {
            let weight = 1.0 / (distance.powf(self.config.idw_exponent) + IDW_EPSILON);
            total_weight += weight;
            altitude += sample.altitude as f64 * weight;
            humidity += sample.humidity as f64 * weight;
            temperature += sample.temperature as f64 * weight;
            gas += sample.gas as f64 * weight;
        }

        let altitude = (altitude / total_weight) as f32;
        let humidity = (humidity / total_weight) as f32;
        let terrain = nearest_terrain(altitude, humidity, clusters, &self.config);

        Some(GridPrediction {
            latitude,
            longitude,
            altitude,
            humidity,
            temperature: (temperature / total_weight) as f32,
            gas: (gas / total_weight) as f32,
            terrain,
            confidence: (1.0 - (nearest / self.config.max_snap_deg) as f32).max(0.0),
        })
    }
}

/// Tags a cell with the terrain of the cluster whose centroid altitude is
/// closest, falling back to the banding rules when no clusters exist.
fn nearest_terrain(
    altitude: f32,
    humidity: f32,
    clusters: &[TerrainCluster],
    config: &AnalysisConfig,
) -> String {
    clusters
        .iter()
        .min_by(|a, b| {
            let da = (a.centroid.altitude - altitude).abs();
            let db = (b.centroid.altitude - altitude).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|cluster| cluster.name.clone())
        .unwrap_or_else(|| terrain_name(altitude, humidity, config))
}

fn fold_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn expand_bounds((lo, hi): (f64, f64), margin: f64) -> (f64, f64) {
    let span = hi - lo;
    (lo - span * margin, hi + span * margin)
}

fn lerp(lo: f64, hi: f64, t: f64) -> f64 {
    lo + (hi - lo) * t
}
