pub mod cluster;
pub mod interpolate;
pub mod loader;
pub mod report;
pub mod suitability;

pub use cluster::{TerrainCentroid, TerrainCluster, TerrainClusterer};
pub use interpolate::{GridInterpolator, GridPrediction};
pub use loader::{LogLoader, SessionSummary, Survey};
pub use report::SurveyReport;
pub use suitability::{SpeciesScore, SuitabilityScorer};
