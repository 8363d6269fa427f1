use crate::prelude::{SessionError, SessionResult};
use crate::reading::{Reading, FIELD_NAMES};
use crate::telemetry::log::LogManager;
use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Append-only CSV log for one boot session.
///
/// Each session creates exactly one new file named from its start time and
/// writes the header once. Rows are never mutated or back-filled; recovery
/// after a crash is simply a fresh file on the next boot.
pub struct SessionLog {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: u64,
    logger: LogManager,
}

impl SessionLog {
    /// Opens a new session file under `dir`. Refuses to reuse an existing
    /// file so a restarted session can never append to an older log.
    pub fn create<P: AsRef<Path>>(dir: P) -> SessionResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let started = Local::now();
        let path = dir.join(format!("rake_log_{}.csv", started.format("%Y%m%d_%H%M%S")));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(FIELD_NAMES)?;

        // Session marker row, first cell only. Loaders treat '#' as comment.
        let mut marker = vec![format!("# New session {}", started.format("%Y-%m-%d %H:%M:%S"))];
        marker.extend(std::iter::repeat(String::new()).take(FIELD_NAMES.len() - 1));
        writer.write_record(&marker)?;
        writer.flush()?;

        let logger = LogManager::new();
        logger.record(&format!("created session log {}", path.display()));

        Ok(Self {
            path,
            writer,
            rows: 0,
            logger,
        })
    }

    /// Appends one reading and flushes it. Unknown fields stay empty.
    pub fn append(&mut self, reading: &Reading) -> SessionResult<()> {
        self.writer.write_record(reading.to_fields())?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Closes the session, reporting how many rows it captured.
    pub fn finish(mut self) -> SessionResult<u64> {
        self.writer.flush()?;
        self.logger.record(&format!(
            "session {} closed after {} rows",
            self.path.display(),
            self.rows
        ));
        Ok(self.rows)
    }

    /// The sortable timestamp text written into each row.
    pub fn timestamp_now() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl SessionError {
    /// True when `create` failed because the target file already existed.
    pub fn is_collision(&self) -> bool {
        matches!(self, SessionError::Io(e) if e.kind() == std::io::ErrorKind::AlreadyExists)
    }
}
