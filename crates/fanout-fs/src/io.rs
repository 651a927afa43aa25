//! Atomic I/O operations and advisory file locking

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use backoff::ExponentialBackoff;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Tuning for lock acquisition and durability of writes.
#[derive(Debug, Clone, Copy)]
pub struct RobustnessConfig {
    /// How long to keep retrying a contended lock before giving up
    pub lock_timeout: Duration,
    /// Whether to fsync temp files before renaming them into place
    pub fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            fsync: true,
        }
    }
}

/// Write content atomically to a file.
///
/// Uses write-to-temp-then-rename so readers see either the old or the new
/// content, never a partial write. The temp file lives in the same directory
/// (same filesystem) and is named `.<name>.<pid>.<n>.tmp`.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();

    // Ensure parent directory exists
    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let result = write_temp(&temp_path, content, config).and_then(|()| {
        fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_temp(temp_path: &Path, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    if config.fsync {
        temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    }
    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read text content, treating a missing file as `None`.
pub fn read_text_if_exists(path: &NormalizedPath) -> Result<Option<String>> {
    match fs::read_to_string(path.to_native()) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path.to_native(), e)),
    }
}

/// An advisory lock held on a lock file. Released on drop.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}

/// Acquire an exclusive lock on `path`, creating the lock file if needed.
///
/// Contended locks are retried with exponential backoff until
/// `config.lock_timeout` elapses.
pub fn lock_exclusive(path: &NormalizedPath, config: RobustnessConfig) -> Result<LockGuard> {
    acquire(path, config, |file| FileExt::try_lock_exclusive(file))
}

/// Acquire a shared lock on `path`, creating the lock file if needed.
pub fn lock_shared(path: &NormalizedPath, config: RobustnessConfig) -> Result<LockGuard> {
    acquire(path, config, |file| FileExt::try_lock_shared(file))
}

fn acquire(
    path: &NormalizedPath,
    config: RobustnessConfig,
    try_lock: impl Fn(&File) -> std::io::Result<()>,
) -> Result<LockGuard> {
    let native_path = path.to_native();
    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&native_path)
        .map_err(|e| Error::io(&native_path, e))?;

    let policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(5),
        max_interval: Duration::from_millis(200),
        max_elapsed_time: Some(config.lock_timeout),
        ..ExponentialBackoff::default()
    };

    backoff::retry(policy, || try_lock(&file).map_err(backoff::Error::transient)).map_err(
        |e| {
            tracing::debug!(path = %native_path.display(), error = %e, "lock acquisition timed out");
            Error::LockFailed {
                path: native_path.clone(),
            }
        },
    )?;

    Ok(LockGuard {
        file,
        path: native_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_atomic_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = NormalizedPath::new(dir.path().join(".log"));

        write_atomic(&path, b"{}", RobustnessConfig::default()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![".log".to_string()]);
    }

    #[test]
    fn read_text_if_exists_maps_missing_to_none() {
        let dir = tempdir().unwrap();
        let path = NormalizedPath::new(dir.path().join("absent.json"));
        assert!(read_text_if_exists(&path).unwrap().is_none());
    }
}
