//! Default layout names and reserved artifacts of a fanout workspace.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Standard locations inside a fanout workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPath {
    /// The `clients` directory holding one directory per client
    ClientsDir,
    /// The `clients/shared` directory (the shared tree)
    SharedDir,
    /// The `src/shared` mirror root inside each client directory
    MirrorSubdir,
    /// The `.log` subscription log inside the shared tree
    LogFile,
    /// The optional `fanout.toml` workspace config
    ConfigFile,
}

impl LayoutPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientsDir => "clients",
            Self::SharedDir => "clients/shared",
            Self::MirrorSubdir => "src/shared",
            Self::LogFile => ".log",
            Self::ConfigFile => "fanout.toml",
        }
    }
}

impl AsRef<Path> for LayoutPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for LayoutPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for LayoutPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// File names that belong to the synchronizer itself and must never be
/// shared, compared, or mirrored.
///
/// Covers the log file, its lock file, and the temp files written by
/// [`crate::io::write_atomic`] while saving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedNames {
    log_file: String,
}

impl ReservedNames {
    pub fn new(log_file: impl Into<String>) -> Self {
        Self {
            log_file: log_file.into(),
        }
    }

    pub fn log_file(&self) -> &str {
        &self.log_file
    }

    /// Name of the lock file kept beside the log.
    pub fn lock_file(&self) -> String {
        format!("{}.lock", self.log_file)
    }

    /// Check a bare file name against the reserved set.
    pub fn is_reserved(&self, name: &str) -> bool {
        if name == self.log_file || name == self.lock_file() {
            return true;
        }
        let temp_prefix = format!(".{}.", self.log_file);
        name.starts_with(&temp_prefix) && name.ends_with(".tmp")
    }

    /// Check the final component of a path against the reserved set.
    pub fn matches(&self, name: &OsStr) -> bool {
        name.to_str().is_some_and(|n| self.is_reserved(n))
    }

    /// Check a path relative to the shared root. Only entries directly at
    /// the root can be reserved; `comp/.log` is an ordinary file.
    pub fn is_reserved_rel(&self, rel: &str) -> bool {
        let rel = rel.trim_matches('/');
        !rel.contains('/') && self.is_reserved(rel)
    }
}

/// The reserved artifacts of one shared tree, located by position.
///
/// The log, its lock file and temp files only ever live directly under the
/// shared root, so a reserved name anywhere else is user content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedArtifacts {
    root: PathBuf,
    names: ReservedNames,
}

impl ReservedArtifacts {
    pub fn new(root: impl Into<PathBuf>, names: ReservedNames) -> Self {
        Self {
            root: root.into(),
            names,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` is one of the artifacts at the shared root.
    pub fn contains(&self, path: &Path) -> bool {
        path.parent().is_some_and(|parent| parent == self.root)
            && path.file_name().is_some_and(|name| self.names.matches(name))
    }
}

impl Default for ReservedNames {
    fn default() -> Self {
        Self::new(LayoutPath::LogFile.as_str())
    }
}
