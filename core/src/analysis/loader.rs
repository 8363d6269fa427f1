use crate::math::stats::StatsHelper;
use crate::prelude::{AnalysisError, AnalysisResult};
use crate::reading::{Reading, TerrainSample};
use crate::telemetry::log::LogManager;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-file summary kept for the historical trend comparison.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub file: String,
    pub rows: usize,
    pub mean_humidity: Option<f32>,
}

/// Everything loaded from a directory of session logs. Malformed rows are
/// counted, never raised.
#[derive(Debug, Clone)]
pub struct Survey {
    pub readings: Vec<Reading>,
    pub skipped: usize,
    pub sessions: Vec<SessionSummary>,
}

impl Survey {
    /// Rows carrying every field the terrain pipeline needs.
    pub fn terrain_samples(&self) -> Vec<TerrainSample> {
        self.readings
            .iter()
            .filter_map(Reading::terrain_sample)
            .collect()
    }

    /// Observed gas-resistance bounds, for nutrient normalization.
    pub fn gas_bounds(&self) -> Option<(f32, f32)> {
        let gas: Vec<f32> = self.readings.iter().filter_map(|r| r.gas).collect();
        StatsHelper::min_max(&gas)
    }
}

/// Loads historical `rake_log_*.csv` files back into typed readings.
pub struct LogLoader {
    dir: PathBuf,
    logger: LogManager,
}

impl LogLoader {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            logger: LogManager::new(),
        }
    }

    /// Loads every session file in filename order (filenames embed the
    /// session start time, so this is chronological), merges the rows, and
    /// reports how many malformed rows were dropped.
    pub fn load(&self) -> AnalysisResult<Survey> {
        let mut files = self.discover()?;
        if files.is_empty() {
            return Err(AnalysisError::NoLogFiles(self.dir.display().to_string()));
        }
        files.sort();

        let mut readings = Vec::new();
        let mut sessions = Vec::new();
        let mut skipped = 0;

        for path in &files {
            let (rows, dropped) = self.load_file(path)?;
            skipped += dropped;

            let humidity: Vec<f32> = rows.iter().filter_map(|r| r.humidity).collect();
            sessions.push(SessionSummary {
                file: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                rows: rows.len(),
                mean_humidity: (!humidity.is_empty()).then(|| StatsHelper::mean(&humidity)),
            });
            readings.extend(rows);
        }

        readings.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        readings.dedup_by(|a, b| a.timestamp == b.timestamp);

        if skipped > 0 {
            self.logger
                .alert(&format!("{} malformed row(s) skipped during load", skipped));
        }
        self.logger.record(&format!(
            "loaded {} readings from {} session file(s)",
            readings.len(),
            files.len()
        ));

        Ok(Survey {
            readings,
            skipped,
            sessions,
        })
    }

    fn discover(&self) -> AnalysisResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            if name.starts_with("rake_log_") && name.ends_with(".csv") {
                files.push(path);
            }
        }
        Ok(files)
    }

    fn load_file(&self, path: &Path) -> AnalysisResult<(Vec<Reading>, usize)> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .comment(Some(b'#'))
            .from_path(path)?;

        let mut rows = Vec::new();
        let mut skipped = 0;
        for record in reader.records() {
            match record {
                Ok(record) => match Reading::from_record(&record) {
                    Some(reading) => rows.push(reading),
                    None => skipped += 1,
                },
                // A truncated or unreadable physical line counts as one
                // skipped row rather than aborting the whole load.
                Err(_) => skipped += 1,
            }
        }
        Ok((rows, skipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_log(dir: &Path, name: &str, body: &str) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        writeln!(
            file,
            "timestamp,temperature,humidity,pressure,gas,latitude,longitude,altitude"
        )
        .unwrap();
        write!(file, "{}", body).unwrap();
    }

    #[test]
    fn malformed_rows_are_dropped_and_counted() {
        let dir = TempDir::new().unwrap();
        write_log(
            dir.path(),
            "rake_log_20250601_080000.csv",
            "ts1,20.0,50,1012,40000,,,\nts2,20.1,51,1012,41000,,,\nts3,bad,52,1012,,,,\n",
        );

        let survey = LogLoader::new(dir.path()).load().unwrap();
        assert_eq!(survey.readings.len(), 2);
        assert_eq!(survey.skipped, 1);

        let temps: Vec<f32> = survey.readings.iter().filter_map(|r| r.temperature).collect();
        assert!((StatsHelper::mean(&temps) - 20.05).abs() < 1e-4);
    }

    #[test]
    fn comment_and_marker_rows_are_not_data() {
        let dir = TempDir::new().unwrap();
        write_log(
            dir.path(),
            "rake_log_20250601_090000.csv",
            "# New session 2025-06-01 09:00:00,,,,,,,\n2025-06-01 09:00:01,19.5,48,1013,,,,\n",
        );

        let survey = LogLoader::new(dir.path()).load().unwrap();
        assert_eq!(survey.readings.len(), 1);
        assert_eq!(survey.skipped, 0);
    }

    #[test]
    fn files_merge_sorted_with_duplicate_timestamps_dropped() {
        let dir = TempDir::new().unwrap();
        write_log(
            dir.path(),
            "rake_log_20250601_080000.csv",
            "2025-06-01 08:00:02,20.0,50,1012,,,,\n2025-06-01 08:00:01,19.9,50,1012,,,,\n",
        );
        write_log(
            dir.path(),
            "rake_log_20250601_090000.csv",
            "2025-06-01 08:00:02,25.0,55,1013,,,,\n2025-06-01 09:00:00,21.0,52,1011,,,,\n",
        );

        let survey = LogLoader::new(dir.path()).load().unwrap();
        let timestamps: Vec<&str> = survey
            .readings
            .iter()
            .map(|r| r.timestamp.as_str())
            .collect();
        assert_eq!(
            timestamps,
            vec![
                "2025-06-01 08:00:01",
                "2025-06-01 08:00:02",
                "2025-06-01 09:00:00"
            ]
        );
        // Duplicate keeps the first file's value.
        assert_eq!(survey.readings[1].temperature, Some(20.0));
        assert_eq!(survey.sessions.len(), 2);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            LogLoader::new(dir.path()).load(),
            Err(AnalysisError::NoLogFiles(_))
        ));
    }

    #[test]
    fn session_written_rows_reload_within_tolerance() {
        use crate::reading::{GpsFix, SensorSample};
        use crate::session::SessionLog;

        let dir = TempDir::new().unwrap();
        let mut session = SessionLog::create(dir.path()).unwrap();
        let written = Reading::from_parts(
            "2025-06-01 08:00:00".to_string(),
            SensorSample {
                temperature: Some(20.057),
                humidity: Some(51.24),
                pressure: Some(1012.63),
                gas: None,
            },
            Some(GpsFix {
                latitude: 37.897_512,
                longitude: -122.246_001,
                altitude: Some(254.37),
            }),
        );
        session.append(&written).unwrap();
        session.finish().unwrap();

        let survey = LogLoader::new(dir.path()).load().unwrap();
        assert_eq!(survey.readings.len(), 1);
        assert_eq!(survey.skipped, 0);

        let reloaded = &survey.readings[0];
        assert_eq!(reloaded.timestamp, written.timestamp);
        assert!((reloaded.temperature.unwrap() - 20.057).abs() < 0.01);
        assert!((reloaded.humidity.unwrap() - 51.24).abs() < 0.01);
        assert!(reloaded.gas.is_none());
        assert!((reloaded.latitude.unwrap() - 37.897_512).abs() < 1e-6);
        assert!((reloaded.altitude.unwrap() - 254.37).abs() < 0.1);
    }

    #[test]
    fn gas_bounds_span_observed_values() {
        let dir = TempDir::new().unwrap();
        write_log(
            dir.path(),
            "rake_log_20250601_080000.csv",
            "ts1,20.0,50,1012,30000,,,\nts2,20.1,51,1012,45000,,,\nts3,20.2,52,1012,,,,\n",
        );
        let survey = LogLoader::new(dir.path()).load().unwrap();
        assert_eq!(survey.gas_bounds(), Some((30000.0, 45000.0)));
    }
}
