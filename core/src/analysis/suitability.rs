use crate::analysis::cluster::TerrainCentroid;
use crate::reading::{NutrientAffinity, SpeciesProfile, NATIVE_SPECIES};
use serde::Serialize;

/// Suitability of one species at one location, bounded 0-100.
#[derive(Debug, Clone, Serialize)]
pub struct SpeciesScore {
    pub species: &'static str,
    pub scientific: &'static str,
    pub score: f32,
    pub factors: Vec<String>,
}

/// Scores species profiles against cluster centroids. Component weights:
/// humidity 40, altitude 30, germination temperature 20, nutrients 10.
pub struct SuitabilityScorer {
    gas_bounds: (f32, f32),
}

impl SuitabilityScorer {
    /// `gas_bounds` are the survey-wide min/max gas readings; nutrient
    /// scoring normalizes against them since raw resistance is unitless
    /// for this purpose.
    pub fn new(gas_bounds: (f32, f32)) -> Self {
        Self { gas_bounds }
    }

    pub fn score_species(&self, profile: &SpeciesProfile, centroid: &TerrainCentroid) -> SpeciesScore {
        let mut factors = Vec::new();
        let mut score = 0.0;

        let (humidity_score, ideal) =
            range_component(centroid.humidity, profile.ideal_humidity, 40.0, 2.0);
        factors.push(if ideal {
            "humidity ideal".to_string()
        } else {
            format!(
                "humidity {:.0}% off ideal",
                distance_to_range(centroid.humidity, profile.ideal_humidity)
            )
        });
        score += humidity_score;

        let (altitude_score, ideal) =
            range_component(centroid.altitude, profile.ideal_altitude, 30.0, 0.3);
        factors.push(if ideal {
            "elevation ideal".to_string()
        } else {
            format!(
                "elevation {:.0}m off ideal",
                distance_to_range(centroid.altitude, profile.ideal_altitude)
            )
        });
        score += altitude_score;

        let (temp_score, ideal) =
            range_component(centroid.temperature, profile.germination_temp, 20.0, 2.0);
        if ideal {
            factors.push("temperature in germination window".to_string());
        } else if temp_score < 10.0 {
            factors.push("temperature far from germination window".to_string());
        } else {
            factors.push("temperature marginal for germination".to_string());
        }
        score += temp_score;

        let nutrient = self.normalized_gas(centroid.gas);
        let nutrient_score = match profile.nutrient_affinity {
            NutrientAffinity::High => {
                if nutrient > 0.6 {
                    factors.push("high-nutrient ground".to_string());
                }
                nutrient * 10.0
            }
            NutrientAffinity::Low => {
                if nutrient < 0.4 {
                    factors.push("low-nutrient ground preferred".to_string());
                }
                (1.0 - nutrient) * 10.0
            }
            NutrientAffinity::Moderate => 5.0,
        };
        score += nutrient_score;

        SpeciesScore {
            species: profile.name,
            scientific: profile.scientific,
            score: score.clamp(0.0, 100.0),
            factors,
        }
    }

    /// Scores every native species against a centroid, best first.
    pub fn score_all(&self, centroid: &TerrainCentroid) -> Vec<SpeciesScore> {
        let mut scores: Vec<SpeciesScore> = NATIVE_SPECIES
            .iter()
            .map(|profile| self.score_species(profile, centroid))
            .collect();
        scores.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scores
    }

    fn normalized_gas(&self, gas: f32) -> f32 {
        let (lo, hi) = self.gas_bounds;
        if hi > lo {
            ((gas - lo) / (hi - lo)).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }
}

/// Full component points inside the ideal range, linear decay with distance
/// to the nearest range edge outside it. Returns (points, was_ideal).
fn range_component(value: f32, range: (f32, f32), full: f32, slope: f32) -> (f32, bool) {
    if value >= range.0 && value <= range.1 {
        (full, true)
    } else {
        let distance = distance_to_range(value, range);
        ((full - distance * slope).max(0.0), false)
    }
}

fn distance_to_range(value: f32, range: (f32, f32)) -> f32 {
    (value - range.0).abs().min((value - range.1).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::NATIVE_SPECIES;

    fn centroid(altitude: f32, humidity: f32, temperature: f32, gas: f32) -> TerrainCentroid {
        TerrainCentroid {
            altitude,
            humidity,
            temperature,
            gas,
        }
    }

    fn scorer() -> SuitabilityScorer {
        SuitabilityScorer::new((20_000.0, 60_000.0))
    }

    #[test]
    fn perfect_match_scores_near_the_top() {
        // Purple Needlegrass: humidity 45-60, altitude 250-400, temp 15-25.
        let profile = &NATIVE_SPECIES[0];
        let score = scorer().score_species(profile, &centroid(320.0, 52.0, 20.0, 40_000.0));
        assert!(score.score >= 90.0);
        assert!(score.factors.iter().any(|f| f == "humidity ideal"));
    }

    #[test]
    fn score_is_monotone_toward_the_humidity_midpoint() {
        let profile = &NATIVE_SPECIES[0];
        let midpoint = profile.humidity_midpoint();
        let scorer = scorer();

        let mut last = f32::NEG_INFINITY;
        // March humidity from far-off toward the midpoint; the score must
        // never decrease.
        for step in 0..20 {
            let humidity = 10.0 + (midpoint - 10.0) * (step as f32 / 19.0);
            let score = scorer
                .score_species(profile, &centroid(320.0, humidity, 20.0, 40_000.0))
                .score;
            assert!(
                score >= last,
                "score dropped from {} to {} at humidity {}",
                last,
                score,
                humidity
            );
            last = score;
        }
    }

    #[test]
    fn score_is_monotone_toward_the_altitude_midpoint() {
        let profile = &NATIVE_SPECIES[3];
        let midpoint = profile.altitude_midpoint();
        let scorer = scorer();

        let mut last = f32::NEG_INFINITY;
        for step in 0..20 {
            let altitude = 100.0 + (midpoint - 100.0) * (step as f32 / 19.0);
            let score = scorer
                .score_species(profile, &centroid(altitude, 48.0, 20.0, 30_000.0))
                .score;
            assert!(score >= last);
            last = score;
        }
    }

    #[test]
    fn hostile_conditions_score_near_zero_without_error() {
        let profile = &NATIVE_SPECIES[4]; // Oatgrass: wet, low, cool.
        let score = scorer().score_species(profile, &centroid(900.0, 5.0, 45.0, 20_000.0));
        assert!(score.score <= 10.0);
    }

    #[test]
    fn nutrient_affinity_splits_high_and_low_species() {
        let rich = centroid(300.0, 60.0, 16.0, 58_000.0);
        let poor = centroid(300.0, 60.0, 16.0, 22_000.0);
        let scorer = scorer();

        // Blue Wild Rye is nutrient-loving, Foothill Needlegrass is not.
        let rye_rich = scorer.score_species(&NATIVE_SPECIES[1], &rich).score;
        let rye_poor = scorer.score_species(&NATIVE_SPECIES[1], &poor).score;
        assert!(rye_rich > rye_poor);

        let foothill_rich = scorer.score_species(&NATIVE_SPECIES[3], &rich).score;
        let foothill_poor = scorer.score_species(&NATIVE_SPECIES[3], &poor).score;
        assert!(foothill_poor > foothill_rich);
    }

    #[test]
    fn score_all_sorts_best_first() {
        let scores = scorer().score_all(&centroid(260.0, 70.0, 15.0, 50_000.0));
        assert_eq!(scores.len(), 5);
        for pair in scores.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
