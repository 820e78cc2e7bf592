//! Per-guest advisory lock.
//!
//! `create` and `start` for the same UUID exclude each other through an
//! exclusive `flock` on `<home>/locks/<uuid>.lock`. Different guests never
//! contend.

use crate::constants::filenames;
use crate::errors::{BhyveboxError, BhyveboxResult};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Exclusive hold on one guest; released on drop or process exit.
#[derive(Debug)]
pub struct GuestLock {
    file: File,
    path: PathBuf,
}

impl GuestLock {
    /// Take the lock for `uuid` without blocking.
    ///
    /// Fails with [`BhyveboxError::Lock`] if another invocation holds it.
    pub fn acquire(locks_dir: &Path, uuid: &str) -> BhyveboxResult<Self> {
        std::fs::create_dir_all(locks_dir).map_err(|e| {
            BhyveboxError::Storage(format!(
                "failed to create lock dir {}: {}",
                locks_dir.display(),
                e
            ))
        })?;

        let path = locks_dir.join(format!("{}{}", uuid, filenames::LOCK_SUFFIX));
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| BhyveboxError::Storage(format!("failed to open lock file: {}", e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;

            let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
            if result != 0 {
                let err = std::io::Error::last_os_error();
                return Err(if err.kind() == std::io::ErrorKind::WouldBlock {
                    BhyveboxError::Lock(format!(
                        "guest {} is busy: another bhyvebox invocation holds {}",
                        uuid,
                        path.display()
                    ))
                } else {
                    BhyveboxError::Lock(format!("failed to lock {}: {}", path.display(), err))
                });
            }
        }

        tracing::debug!(uuid, lock_path = %path.display(), "Acquired guest lock");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for GuestLock {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            unsafe {
                libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
            }
        }
        tracing::debug!(lock_path = %self.path.display(), "Released guest lock");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_file_location() {
        let temp_dir = TempDir::new().unwrap();
        let locks = temp_dir.path().join("locks");
        let lock = GuestLock::acquire(&locks, "abc").unwrap();

        assert_eq!(lock.path(), locks.join("abc.lock"));
        assert!(lock.path().exists());
    }

    #[test]
    fn test_same_guest_is_exclusive() {
        let temp_dir = TempDir::new().unwrap();
        let _held = GuestLock::acquire(temp_dir.path(), "abc").unwrap();

        let err = GuestLock::acquire(temp_dir.path(), "abc").unwrap_err();
        assert!(matches!(err, BhyveboxError::Lock(_)));
        assert!(err.to_string().contains("guest abc is busy"));
    }

    #[test]
    fn test_released_on_drop() {
        let temp_dir = TempDir::new().unwrap();
        {
            let _lock = GuestLock::acquire(temp_dir.path(), "abc").unwrap();
        }
        let _again = GuestLock::acquire(temp_dir.path(), "abc").unwrap();
    }

    #[test]
    fn test_different_guests_independent() {
        let temp_dir = TempDir::new().unwrap();
        let _a = GuestLock::acquire(temp_dir.path(), "a").unwrap();
        let _b = GuestLock::acquire(temp_dir.path(), "b").unwrap();
    }
}
