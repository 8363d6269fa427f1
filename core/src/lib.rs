//! Survey data model and terrain-analysis core for the rake trail logger.
//!
//! The modules mirror the two halves of the field setup: the session side
//! (readings, per-boot CSV logs, singleton locking) and the analysis side
//! (log loading, terrain clustering, forage suitability, grid prediction).

pub mod analysis;
pub mod math;
pub mod prelude;
pub mod reading;
pub mod session;
pub mod telemetry;

pub use prelude::{AnalysisConfig, AnalysisError, SessionError};
pub use reading::{GpsFix, Reading, SensorSample};
