pub mod record;
pub mod species;

pub use record::{GpsFix, Reading, SensorSample, TerrainSample, FIELD_NAMES};
pub use species::{NutrientAffinity, SpeciesProfile, NATIVE_SPECIES};
