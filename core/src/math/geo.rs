pub struct GeoHelper;

impl GeoHelper {
    /// Planar distance in degrees between two coordinates. The surveyed
    /// areas span well under a kilometer, so great-circle math buys nothing
    /// over the flat approximation the weighting formulas expect.
    pub fn planar_distance_deg(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
        let dlat = lat_a - lat_b;
        let dlon = lon_a - lon_b;
        (dlat * dlat + dlon * dlon).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_zero_for_identical_points() {
        assert_eq!(
            GeoHelper::planar_distance_deg(37.8975, -122.2461, 37.8975, -122.2461),
            0.0
        );
    }

    #[test]
    fn distance_matches_pythagoras() {
        let d = GeoHelper::planar_distance_deg(0.0, 0.0, 0.003, 0.004);
        assert!((d - 0.005).abs() < 1e-12);
    }
}
