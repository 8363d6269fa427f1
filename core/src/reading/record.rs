use serde::{Deserialize, Serialize};

/// CSV column order shared by the writer and every consumer.
pub const FIELD_NAMES: [&str; 8] = [
    "timestamp",
    "temperature",
    "humidity",
    "pressure",
    "gas",
    "latitude",
    "longitude",
    "altitude",
];

/// One logged row. Empty CSV fields mean "unknown", never zero; the
/// timestamp is sortable text and stays opaque on the analysis side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: String,
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
    pub pressure: Option<f32>,
    pub gas: Option<f32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f32>,
}

/// One environmental sample from the BME680, before GPS merge.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SensorSample {
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
    pub pressure: Option<f32>,
    pub gas: Option<f32>,
}

impl SensorSample {
    /// The all-null sample substituted after a transient read failure.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A valid GPS fix in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f32>,
}

/// The projection of a reading carrying every field terrain analysis needs.
#[derive(Debug, Clone, Copy)]
pub struct TerrainSample {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f32,
    pub humidity: f32,
    pub temperature: f32,
    pub gas: f32,
}

impl Reading {
    pub fn from_parts(timestamp: String, sample: SensorSample, fix: Option<GpsFix>) -> Self {
        Self {
            timestamp,
            temperature: sample.temperature,
            humidity: sample.humidity,
            pressure: sample.pressure,
            gas: sample.gas,
            latitude: fix.map(|f| f.latitude),
            longitude: fix.map(|f| f.longitude),
            altitude: fix.and_then(|f| f.altitude),
        }
    }

    /// Formats the row for the session CSV. Precision is fixed so a written
    /// row reloads to the same values within formatting tolerance.
    pub fn to_fields(&self) -> [String; 8] {
        [
            self.timestamp.clone(),
            format_opt(self.temperature, 2),
            format_opt(self.humidity, 2),
            format_opt(self.pressure, 2),
            format_opt(self.gas, 0),
            self.latitude.map(|v| format!("{:.6}", v)).unwrap_or_default(),
            self.longitude.map(|v| format!("{:.6}", v)).unwrap_or_default(),
            format_opt(self.altitude, 1),
        ]
    }

    /// Parses one CSV record. `None` means the row is malformed (wrong
    /// column count, or a non-empty numeric field that fails to parse) and
    /// must be skipped and counted, not raised.
    pub fn from_record(record: &csv::StringRecord) -> Option<Self> {
        if record.len() != FIELD_NAMES.len() {
            return None;
        }
        let timestamp = record.get(0)?.trim();
        if timestamp.is_empty() {
            return None;
        }
        Some(Self {
            timestamp: timestamp.to_string(),
            temperature: parse_opt_f32(record.get(1)?)?,
            humidity: parse_opt_f32(record.get(2)?)?,
            pressure: parse_opt_f32(record.get(3)?)?,
            gas: parse_opt_f32(record.get(4)?)?,
            latitude: parse_opt_f64(record.get(5)?)?,
            longitude: parse_opt_f64(record.get(6)?)?,
            altitude: parse_opt_f32(record.get(7)?)?,
        })
    }

    /// Returns the sample used by clustering and interpolation, or `None`
    /// when any of the six analysis fields is unknown.
    pub fn terrain_sample(&self) -> Option<TerrainSample> {
        Some(TerrainSample {
            latitude: self.latitude?,
            longitude: self.longitude?,
            altitude: self.altitude?,
            humidity: self.humidity?,
            temperature: self.temperature?,
            gas: self.gas?,
        })
    }

    pub fn parsed_timestamp(&self) -> Option<chrono::NaiveDateTime> {
        chrono::NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%d %H:%M:%S").ok()
    }
}

fn format_opt(value: Option<f32>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_default()
}

// Outer None = malformed field, inner None = legitimately unknown.
fn parse_opt_f32(field: &str) -> Option<Option<f32>> {
    let field = field.trim();
    if field.is_empty() {
        return Some(None);
    }
    field.parse::<f32>().ok().map(Some)
}

fn parse_opt_f64(field: &str) -> Option<Option<f64>> {
    let field = field.trim();
    if field.is_empty() {
        return Some(None);
    }
    field.parse::<f64>().ok().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    #[test]
    fn fields_round_trip_within_formatting_tolerance() {
        let reading = Reading {
            timestamp: "2025-06-01 08:30:00".to_string(),
            temperature: Some(20.057),
            humidity: Some(51.2),
            pressure: Some(1012.63),
            gas: Some(40812.4),
            latitude: Some(37.897_512),
            longitude: Some(-122.246_001),
            altitude: Some(254.37),
        };

        let fields = reading.to_fields();
        let reloaded =
            Reading::from_record(&record(&fields.iter().map(String::as_str).collect::<Vec<_>>()))
                .unwrap();

        assert_eq!(reloaded.timestamp, reading.timestamp);
        assert!((reloaded.temperature.unwrap() - 20.057).abs() < 0.01);
        assert!((reloaded.gas.unwrap() - 40812.0).abs() < 1.0);
        assert!((reloaded.latitude.unwrap() - 37.897_512).abs() < 1e-6);
        assert!((reloaded.altitude.unwrap() - 254.4).abs() < 0.1);
    }

    #[test]
    fn empty_fields_reload_as_unknown() {
        let row = record(&["2025-06-01 08:30:01", "", "", "", "", "", "", ""]);
        let reading = Reading::from_record(&row).unwrap();
        assert!(reading.temperature.is_none());
        assert!(reading.gas.is_none());
        assert!(reading.latitude.is_none());
        assert!(reading.terrain_sample().is_none());
    }

    #[test]
    fn non_numeric_numeric_field_is_malformed() {
        let row = record(&["ts3", "bad", "52", "1012", "", "", "", ""]);
        assert!(Reading::from_record(&row).is_none());
    }

    #[test]
    fn wrong_column_count_is_malformed() {
        let row = record(&["ts1", "20.0", "50"]);
        assert!(Reading::from_record(&row).is_none());
    }

    #[test]
    fn terrain_sample_requires_all_six_fields() {
        let row = record(&[
            "2025-06-01 08:30:02",
            "19.8",
            "55.0",
            "1011.90",
            "41250",
            "37.897600",
            "-122.246100",
            "260.5",
        ]);
        let sample = Reading::from_record(&row).unwrap().terrain_sample().unwrap();
        assert!((sample.altitude - 260.5).abs() < 1e-3);
        assert!((sample.gas - 41250.0).abs() < 1e-3);
    }
}
