use crate::acquisition::{GpsSource, SensorSource};
use rakecore::{GpsFix, SensorSample};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Synthetic BME680 for benchless development: slow sine drifts with a
/// little jitter, and a gas channel that stays unknown through the same
/// warm-up window the real heater needs.
pub struct SyntheticSensor {
    rng: StdRng,
    tick: u64,
    warmup_ticks: u64,
}

impl SyntheticSensor {
    pub fn new(seed: u64, warmup_ticks: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            tick: 0,
            warmup_ticks,
        }
    }
}

impl SensorSource for SyntheticSensor {
    fn sample(&mut self) -> anyhow::Result<SensorSample> {
        let t = self.tick as f32;
        let gas = if self.tick >= self.warmup_ticks {
            Some(40_000.0 + 5_000.0 * (t / 60.0).sin() + self.rng.gen_range(-100.0..100.0))
        } else {
            None
        };
        self.tick += 1;

        Ok(SensorSample {
            temperature: Some(22.0 + 0.5 * (t / 15.0).sin() + self.rng.gen_range(-0.05..0.05)),
            humidity: Some(45.0 + 5.0 * (t / 25.0).sin() + self.rng.gen_range(-0.2..0.2)),
            pressure: Some(1013.0 + 2.0 * (t / 40.0).sin() + self.rng.gen_range(-0.1..0.1)),
            gas,
        })
    }
}

/// Synthetic receiver wandering around the Lake Anza trailhead.
pub struct SyntheticGps {
    rng: StdRng,
    latitude: f64,
    longitude: f64,
    tick: u64,
}

impl SyntheticGps {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            latitude: 37.8975,
            longitude: -122.2461,
            tick: 0,
        }
    }
}

impl GpsSource for SyntheticGps {
    fn read_fix(&mut self) -> Option<GpsFix> {
        self.latitude += self.rng.gen_range(-1e-5..1e-5);
        self.longitude += self.rng.gen_range(-1e-5..1e-5);
        let t = self.tick as f32;
        self.tick += 1;

        Some(GpsFix {
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: Some(255.0 + 30.0 * (t / 90.0).sin() + self.rng.gen_range(-0.5..0.5)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_stays_unknown_through_warmup_then_appears() {
        let mut sensor = SyntheticSensor::new(7, 3);
        for _ in 0..3 {
            assert!(sensor.sample().unwrap().gas.is_none());
        }
        let settled = sensor.sample().unwrap();
        assert!(settled.gas.is_some());
        assert!(settled.gas.unwrap() > 30_000.0);
    }

    #[test]
    fn samples_stay_in_plausible_field_ranges() {
        let mut sensor = SyntheticSensor::new(11, 0);
        for _ in 0..200 {
            let sample = sensor.sample().unwrap();
            let temperature = sample.temperature.unwrap();
            let humidity = sample.humidity.unwrap();
            assert!((20.0..=24.0).contains(&temperature));
            assert!((39.0..=51.0).contains(&humidity));
        }
    }

    #[test]
    fn gps_walk_stays_near_the_trailhead() {
        let mut gps = SyntheticGps::new(5);
        for _ in 0..500 {
            let fix = gps.read_fix().unwrap();
            assert!((fix.latitude - 37.8975).abs() < 0.01);
            assert!((fix.longitude + 122.2461).abs() < 0.01);
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_stream() {
        let mut a = SyntheticSensor::new(42, 0);
        let mut b = SyntheticSensor::new(42, 0);
        for _ in 0..10 {
            assert_eq!(a.sample().unwrap().temperature, b.sample().unwrap().temperature);
        }
    }
}
