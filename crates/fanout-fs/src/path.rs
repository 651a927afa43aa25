//! Normalized path handling for the shared tree and client mirrors

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Workspace roots, mirror roots and log records are all kept in this form
/// and converted to platform-native paths only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let normalized = path_str.replace('\\', "/");
        Self { inner: normalized }
    }

    /// Resolve an existing directory to its canonical form.
    ///
    /// Uses `dunce` so Windows paths stay free of the `\\?\` prefix.
    pub fn canonical(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let resolved = dunce::canonicalize(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::new(resolved))
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    ///
    /// A trailing slash on the segment is dropped so that module paths
    /// (`comp/`) join to the directory itself.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        let segment_normalized = segment_normalized.trim_end_matches('/');
        if segment_normalized.is_empty() {
            return self.clone();
        }
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self { inner: joined }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

/// A path relative to the shared tree, as recorded in the subscription log.
///
/// Module paths always end in `/` so that a plain string prefix test is
/// also a path-component prefix test: `comp/` covers `comp/x.ts` but not
/// `components/x.ts`. File paths never start or end with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SharePath {
    inner: String,
}

impl SharePath {
    /// Normalize a raw module (directory) path.
    pub fn module(raw: &str) -> Result<Self> {
        let segments = clean_segments(raw)?;
        Ok(Self {
            inner: format!("{}/", segments.join("/")),
        })
    }

    /// Normalize a raw file path into `dir/name` (or bare `name` at the
    /// root of the shared tree).
    pub fn file(raw: &str) -> Result<Self> {
        let mut segments = clean_segments(raw)?;
        let name = segments.pop().unwrap_or_default();
        let inner = if segments.is_empty() {
            name
        } else {
            format!("{}/{}", segments.join("/"), name)
        };
        Ok(Self { inner })
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn into_string(self) -> String {
        self.inner
    }

    /// True for module (directory prefix) paths.
    pub fn is_module(&self) -> bool {
        self.inner.ends_with('/')
    }

    /// The final component, without any trailing slash.
    pub fn file_name(&self) -> &str {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// Whether `other` lies at or under this module path.
    ///
    /// Always false for file paths.
    pub fn covers(&self, other: &str) -> bool {
        self.is_module() && other.starts_with(&self.inner)
    }
}

impl std::fmt::Display for SharePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl AsRef<str> for SharePath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

fn clean_segments(raw: &str) -> Result<Vec<String>> {
    let normalized = raw.replace('\\', "/");
    let mut segments = Vec::new();
    for segment in normalized.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(Error::invalid_path(
                    raw,
                    "parent components are not allowed in shared paths",
                ));
            }
            other => segments.push(other.to_string()),
        }
    }
    if segments.is_empty() {
        return Err(Error::invalid_path(raw, "path is empty"));
    }
    Ok(segments)
}

/// Validate that a name is usable as a single path segment (client names).
pub fn validate_segment(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_path(name, "name is empty"));
    }
    if name == "." || name == ".." {
        return Err(Error::invalid_path(name, "name cannot be a relative marker"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(Error::invalid_path(name, "name cannot contain path separators"));
    }
    Ok(())
}
