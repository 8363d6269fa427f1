pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f32>() / samples.len() as f32
    }

    /// Population standard deviation; zero for fewer than two samples.
    pub fn std_dev(samples: &[f32]) -> f32 {
        if samples.len() < 2 {
            return 0.0;
        }
        let mean = Self::mean(samples);
        let var = samples.iter().map(|&v| (v - mean) * (v - mean)).sum::<f32>()
            / samples.len() as f32;
        var.sqrt()
    }

    pub fn min_max(samples: &[f32]) -> Option<(f32, f32)> {
        let mut iter = samples.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}
