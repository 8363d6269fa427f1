use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub log_dir: PathBuf,
    pub interval_secs: f64,
    pub i2c_bus: String,
    pub gps_port: String,
    pub gps_baud: u32,
    /// Gas readings are suppressed for this long after startup; the heater
    /// needs minutes of continuous operation before resistance stabilizes.
    pub gas_warmup_secs: u64,
    /// Rolling history depth kept for the ring display.
    pub history_len: usize,
    pub bind: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("."),
            interval_secs: 1.0,
            i2c_bus: "/dev/i2c-1".to_string(),
            gps_port: "/dev/serial0".to_string(),
            gps_baud: 9600,
            gas_warmup_secs: 300,
            history_len: 120,
            bind: "127.0.0.1:9000".to_string(),
        }
    }
}

impl LoggerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading logger config {}", path_ref.display()))?;
        let config: LoggerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing logger config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        log_dir: PathBuf,
        interval_secs: f64,
        i2c_bus: String,
        gps_port: String,
        gps_baud: u32,
        bind: String,
    ) -> Self {
        Self {
            log_dir,
            interval_secs,
            i2c_bus,
            gps_port,
            gps_baud,
            bind,
            ..Self::default()
        }
    }

    pub fn warmup_ticks(&self) -> u64 {
        if self.interval_secs <= 0.0 {
            return 0;
        }
        (self.gas_warmup_secs as f64 / self.interval_secs).ceil() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"log_dir: /var/log/rake\ninterval_secs: 2.0\ngps_baud: 4800\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = LoggerConfig::load(&path).unwrap();
        assert_eq!(cfg.log_dir, PathBuf::from("/var/log/rake"));
        assert_eq!(cfg.interval_secs, 2.0);
        assert_eq!(cfg.gps_baud, 4800);
        // Unlisted fields keep their defaults.
        assert_eq!(cfg.history_len, 120);
    }

    #[test]
    fn warmup_ticks_scale_with_interval() {
        let cfg = LoggerConfig {
            gas_warmup_secs: 300,
            interval_secs: 2.0,
            ..LoggerConfig::default()
        };
        assert_eq!(cfg.warmup_ticks(), 150);
        assert_eq!(LoggerConfig::default().warmup_ticks(), 300);
    }
}
