//! Durable storage for the subscription log
//!
//! Reads take a shared lock on the lock file beside the log; writes take an
//! exclusive one and go through `write_atomic`, so a reader never sees a
//! torn file. Read-modify-write cycles hold a [`LogGuard`] throughout.

use fanout_fs::{LockGuard, NormalizedPath, RobustnessConfig, io};

use super::SubscriptionLog;
use crate::config::Layout;
use crate::{Error, Result};

/// Loads and saves the subscription log of one workspace.
#[derive(Debug, Clone)]
pub struct LogStore {
    path: NormalizedPath,
    lock_path: NormalizedPath,
    robustness: RobustnessConfig,
}

impl LogStore {
    pub fn new(layout: &Layout) -> Self {
        Self::at(layout.log_path(), layout.lock_path())
    }

    /// Create a store for explicit log and lock file paths.
    pub fn at(path: NormalizedPath, lock_path: NormalizedPath) -> Self {
        Self {
            path,
            lock_path,
            robustness: RobustnessConfig::default(),
        }
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// Load the log. A missing log file is an empty log, and loading it
    /// touches nothing on disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LogCorrupt`] if the file exists but cannot be parsed.
    pub fn load(&self) -> Result<SubscriptionLog> {
        // Saves replace the file atomically, so absence needs no lock.
        if !self.path.exists() {
            return Ok(SubscriptionLog::new());
        }
        let _lock = io::lock_shared(&self.lock_path, self.robustness)?;
        self.read()
    }

    /// Replace the persisted log with `log`.
    pub fn save(&self, log: &SubscriptionLog) -> Result<()> {
        let _lock = io::lock_exclusive(&self.lock_path, self.robustness)?;
        self.write(log)
    }

    /// Take the exclusive lock for a load-modify-save cycle.
    pub fn lock(&self) -> Result<LogGuard<'_>> {
        let lock = io::lock_exclusive(&self.lock_path, self.robustness)?;
        Ok(LogGuard { store: self, _lock: lock })
    }

    fn read(&self) -> Result<SubscriptionLog> {
        let Some(content) = io::read_text_if_exists(&self.path)? else {
            return Ok(SubscriptionLog::new());
        };
        if content.trim().is_empty() {
            return Ok(SubscriptionLog::new());
        }
        SubscriptionLog::from_json(&content).map_err(|e| Error::LogCorrupt {
            path: self.path.to_native(),
            message: e.to_string(),
        })
    }

    fn write(&self, log: &SubscriptionLog) -> Result<()> {
        let mut content = log.to_json()?;
        content.push('\n');
        io::write_atomic(&self.path, content.as_bytes(), self.robustness)?;
        tracing::debug!(path = %self.path, clients = log.len(), "subscription log saved");
        Ok(())
    }
}

/// Exclusive access to the log, released on drop.
#[derive(Debug)]
pub struct LogGuard<'a> {
    store: &'a LogStore,
    _lock: LockGuard,
}

impl LogGuard<'_> {
    pub fn load(&self) -> Result<SubscriptionLog> {
        self.store.read()
    }

    pub fn save(&self, log: &SubscriptionLog) -> Result<()> {
        self.store.write(log)
    }
}
