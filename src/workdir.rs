//! Scoped change of the process working directory.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{HarnessError, Result};

/// Changes the process working directory for as long as it is alive.
///
/// The previous directory is restored on drop, so every exit path of the
/// enclosing scope, including `?` returns, leaves the process where it was.
#[derive(Debug)]
pub struct WorkingDir {
    previous: PathBuf,
    current: PathBuf,
}

impl WorkingDir {
    pub fn enter(path: &Path) -> Result<Self> {
        let previous = env::current_dir().map_err(|source| HarnessError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        let current = previous.join(path);

        env::set_current_dir(&current).map_err(|source| HarnessError::Io {
            path: current.clone(),
            source,
        })?;
        tracing::trace!(dir = %current.display(), "Entered working directory");

        Ok(Self { previous, current })
    }

    /// Absolute path of the directory entered.
    pub fn path(&self) -> &Path {
        &self.current
    }
}

impl Drop for WorkingDir {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            tracing::error!(
                "Failed to restore working directory {}: {}",
                self.previous.display(),
                e
            );
        }
    }
}

/// Serializes tests that change the process working directory.
#[cfg(test)]
pub(crate) fn cwd_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::Mutex;

    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn restores_directory_on_drop() {
        let _lock = cwd_lock();
        let tmp = TempDir::new().unwrap();
        let before = env::current_dir().unwrap();

        {
            let guard = WorkingDir::enter(tmp.path()).unwrap();
            assert_eq!(
                env::current_dir().unwrap().canonicalize().unwrap(),
                tmp.path().canonicalize().unwrap()
            );
            assert!(guard.path().is_absolute());
        }

        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn restores_directory_on_early_return() {
        let _lock = cwd_lock();
        let tmp = TempDir::new().unwrap();
        let before = env::current_dir().unwrap();

        fn fails_inside(path: &Path) -> Result<()> {
            let _dir = WorkingDir::enter(path)?;
            Err(HarnessError::ExecutionFailed)
        }

        assert!(fails_inside(tmp.path()).is_err());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let _lock = cwd_lock();
        let tmp = TempDir::new().unwrap();
        let before = env::current_dir().unwrap();

        let result = WorkingDir::enter(&tmp.path().join("missing"));

        assert!(matches!(result, Err(HarnessError::Io { .. })));
        assert_eq!(env::current_dir().unwrap(), before);
    }
}
