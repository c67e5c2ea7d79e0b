//! Advisory file-lock primitive
//!
//! Non-blocking, exclusive locks for callers that need single-instance
//! execution, e.g. a cron-driven refresh. The inventory cache itself relies
//! on atomic renames and never takes a lock.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::LockError;

/// An exclusively held advisory lock, released on `release()` or drop
pub struct Lockfile {
    file: Option<File>,
    path: PathBuf,
}

impl Lockfile {
    /// Try to take the lock; fails immediately when another process holds it
    pub fn acquire(path: impl AsRef<Path>) -> std::result::Result<Self, LockError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| LockError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;

        file.try_lock_exclusive().map_err(|e| {
            if e.kind() == ErrorKind::WouldBlock {
                log::debug!("lock {} already held", path.display());
                LockError::Held { path: path.clone() }
            } else {
                LockError::Io {
                    path: path.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        log::debug!("acquired lock {}", path.display());
        Ok(Self {
            file: Some(file),
            path,
        })
    }

    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release explicitly; dropping the handle releases as well
    pub fn release(mut self) -> std::result::Result<(), LockError> {
        if let Some(file) = self.file.take() {
            FileExt::unlock(&file).map_err(|e| LockError::Io {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = FileExt::unlock(&file);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_and_release() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refresh.lock");

        let lock = Lockfile::acquire(&path).unwrap();
        assert_eq!(lock.path(), path);
        lock.release().unwrap();
    }

    #[test]
    fn test_second_acquire_fails_while_held() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refresh.lock");

        let _held = Lockfile::acquire(&path).unwrap();
        match Lockfile::acquire(&path) {
            Err(LockError::Held { .. }) => (),
            Err(other) => panic!("expected LockError::Held, got {other:?}"),
            Ok(_) => panic!("expected LockError::Held, lock was granted"),
        }
    }

    #[test]
    fn test_acquire_succeeds_after_release() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refresh.lock");

        let first = Lockfile::acquire(&path).unwrap();
        first.release().unwrap();
        let second = Lockfile::acquire(&path).unwrap();
        second.release().unwrap();
    }

    #[test]
    fn test_drop_releases_lock() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refresh.lock");

        {
            let _held = Lockfile::acquire(&path).unwrap();
        }
        assert!(Lockfile::acquire(&path).is_ok());
    }

    #[test]
    fn test_unwritable_path_is_io_error() {
        match Lockfile::acquire("/nonexistent-dir/refresh.lock") {
            Err(LockError::Io { .. }) => (),
            _ => panic!("expected LockError::Io"),
        }
    }
}
