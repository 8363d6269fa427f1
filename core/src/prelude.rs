use serde::{Deserialize, Serialize};

/// Tunable constants for the analysis pipeline.
///
/// The original survey hardware baked these into the scripts; here they are
/// configuration so a run can be reproduced from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Width of one altitude band when naming terrain types, in meters.
    pub band_width_m: f32,
    /// Altitude of the lowest band boundary, in meters.
    pub band_base_m: f32,
    /// Clusters below this member count report reduced confidence.
    pub min_cluster_samples: usize,
    /// Upper bound on the k-means cluster count.
    pub max_clusters: usize,
    /// Target number of samples backing each cluster.
    pub samples_per_cluster: usize,
    /// Neighbors consulted per grid cell during interpolation.
    pub idw_neighbors: usize,
    /// Inverse-distance weighting exponent.
    pub idw_exponent: f64,
    /// Cells per side of the prediction grid.
    pub grid_resolution: usize,
    /// Fraction by which the grid extends past the surveyed bounds.
    pub grid_margin: f64,
    /// Grid cells farther than this from every sample stay unmapped, in degrees.
    pub max_snap_deg: f64,
    pub kmeans_max_iterations: u64,
    /// Minimum suitability score that triggers a dispersal recommendation.
    pub score_recommend_threshold: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            band_width_m: 50.0,
            band_base_m: 250.0,
            min_cluster_samples: 5,
            max_clusters: 5,
            samples_per_cluster: 10,
            idw_neighbors: 4,
            idw_exponent: 2.0,
            grid_resolution: 50,
            grid_margin: 0.2,
            max_snap_deg: 0.01,
            kmeans_max_iterations: 200,
            score_recommend_threshold: 60.0,
        }
    }
}

/// Errors raised while writing or locking a logging session.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("another logger instance holds the session lock at {0}")]
    AlreadyRunning(String),
    #[error("session io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv write failure: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised by the analysis pipeline.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("no rake_log_*.csv files found under {0}")]
    NoLogFiles(String),
    #[error("only {0} complete samples, terrain analysis needs at least {1}")]
    InsufficientData(usize, usize),
    #[error("clustering failed: {0}")]
    Clustering(String),
    #[error("log io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv read failure: {0}")]
    Csv(#[from] csv::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;
pub type AnalysisResult<T> = Result<T, AnalysisError>;
