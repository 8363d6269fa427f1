/// How strongly a species benefits from manure-enriched ground. Gas
/// resistance readings stand in for nutrient presence during scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutrientAffinity {
    Low,
    Moderate,
    High,
}

/// Hand-authored profile for one native forage species. Read-only
/// reference data consumed by the suitability scorer.
#[derive(Debug, Clone, Copy)]
pub struct SpeciesProfile {
    pub name: &'static str,
    pub scientific: &'static str,
    /// Preferred relative humidity band, % RH.
    pub ideal_humidity: (f32, f32),
    /// Preferred elevation band, meters.
    pub ideal_altitude: (f32, f32),
    /// Germination temperature window, °C.
    pub germination_temp: (f32, f32),
    pub nutrient_affinity: NutrientAffinity,
    pub description: &'static str,
    pub seeds_per_lb: u32,
}

impl SpeciesProfile {
    pub fn humidity_midpoint(&self) -> f32 {
        (self.ideal_humidity.0 + self.ideal_humidity.1) / 2.0
    }

    pub fn altitude_midpoint(&self) -> f32 {
        (self.ideal_altitude.0 + self.ideal_altitude.1) / 2.0
    }
}

/// The five native East Bay forage species suitable for cattle grazing.
pub const NATIVE_SPECIES: [SpeciesProfile; 5] = [
    SpeciesProfile {
        name: "Purple Needlegrass",
        scientific: "Stipa pulchra",
        ideal_humidity: (45.0, 60.0),
        ideal_altitude: (250.0, 400.0),
        germination_temp: (15.0, 25.0),
        nutrient_affinity: NutrientAffinity::Moderate,
        description: "CA state grass, drought-tolerant, deep roots",
        seeds_per_lb: 150_000,
    },
    SpeciesProfile {
        name: "Blue Wild Rye",
        scientific: "Elymus glaucus",
        ideal_humidity: (55.0, 75.0),
        ideal_altitude: (200.0, 350.0),
        germination_temp: (10.0, 20.0),
        nutrient_affinity: NutrientAffinity::High,
        description: "Bunchgrass, excellent forage quality",
        seeds_per_lb: 110_000,
    },
    SpeciesProfile {
        name: "California Brome",
        scientific: "Bromus carinatus",
        ideal_humidity: (50.0, 70.0),
        ideal_altitude: (230.0, 380.0),
        germination_temp: (12.0, 22.0),
        nutrient_affinity: NutrientAffinity::High,
        description: "Quick establishment, palatable to cattle",
        seeds_per_lb: 140_000,
    },
    SpeciesProfile {
        name: "Foothill Needlegrass",
        scientific: "Stipa lepida",
        ideal_humidity: (40.0, 55.0),
        ideal_altitude: (280.0, 450.0),
        germination_temp: (15.0, 25.0),
        nutrient_affinity: NutrientAffinity::Low,
        description: "Exceptional drought resistance",
        seeds_per_lb: 160_000,
    },
    SpeciesProfile {
        name: "California Oatgrass",
        scientific: "Danthonia californica",
        ideal_humidity: (60.0, 80.0),
        ideal_altitude: (200.0, 300.0),
        germination_temp: (10.0, 18.0),
        nutrient_affinity: NutrientAffinity::Moderate,
        description: "Shade tolerant, near water sources",
        seeds_per_lb: 180_000,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_table_holds_five_well_formed_profiles() {
        assert_eq!(NATIVE_SPECIES.len(), 5);
        for profile in &NATIVE_SPECIES {
            assert!(profile.ideal_humidity.0 < profile.ideal_humidity.1);
            assert!(profile.ideal_altitude.0 < profile.ideal_altitude.1);
            assert!(profile.germination_temp.0 < profile.germination_temp.1);
            assert!(profile.seeds_per_lb > 0);
        }
    }

    #[test]
    fn midpoints_fall_inside_their_ranges() {
        let rye = &NATIVE_SPECIES[1];
        assert!(rye.humidity_midpoint() > rye.ideal_humidity.0);
        assert!(rye.humidity_midpoint() < rye.ideal_humidity.1);
    }
}
