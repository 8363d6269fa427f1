use crate::prelude::{SessionError, SessionResult};
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Exclusive advisory lock guarding the log directory and, by convention,
/// the serial device. Two logger processes writing the same session target
/// was the primary field failure mode; the second instance must refuse to
/// start instead of corrupting output.
pub struct SessionLock {
    file: std::fs::File,
    path: PathBuf,
}

impl SessionLock {
    /// Takes the lock, creating the lock file if needed. Fails with
    /// [`SessionError::AlreadyRunning`] when another process holds it.
    pub fn acquire<P: AsRef<Path>>(dir: P) -> SessionResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let path = dir.join("rake-logger.lock");
        let file = OpenOptions::new().create(true).write(true).open(&path)?;
        file.try_lock_exclusive()
            .map_err(|_| SessionError::AlreadyRunning(path.display().to_string()))?;

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        // Held until process exit otherwise; errors on unlock are moot.
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn second_acquire_fails_while_lock_held() {
        let dir = TempDir::new().unwrap();
        let first = SessionLock::acquire(dir.path()).unwrap();

        let second = SessionLock::acquire(dir.path());
        assert!(matches!(second, Err(SessionError::AlreadyRunning(_))));
        drop(first);
    }

    #[test]
    fn lock_is_reacquirable_after_release() {
        let dir = TempDir::new().unwrap();
        drop(SessionLock::acquire(dir.path()).unwrap());
        assert!(SessionLock::acquire(dir.path()).is_ok());
    }
}
