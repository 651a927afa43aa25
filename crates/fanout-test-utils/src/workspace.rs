//! [`TestWorkspace`] builder for fanout test scenarios.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use walkdir::WalkDir;

/// Relative location of the shared tree in the default layout.
pub const SHARED_DIR: &str = "clients/shared";

/// Relative location of a client mirror inside its client directory.
pub const MIRROR_SUBDIR: &str = "src/shared";

/// File contents and modification times under a directory, keyed by
/// forward-slash relative path.
pub type TreeSnapshot = BTreeMap<String, (Vec<u8>, SystemTime)>;

/// A temporary workspace with the default fanout layout: `clients/shared`
/// plus one directory per client.
///
/// All `rel` arguments are relative to the workspace root unless the method
/// name says otherwise.
///
/// # Example
///
/// ```rust,no_run
/// use fanout_test_utils::TestWorkspace;
///
/// let ws = TestWorkspace::new().with_client("app");
/// ws.write_shared("comp/x.ts", "export {}");
/// ws.age_shared("comp/x.ts", 60);
/// ws.assert_file_not_exists("clients/app/src/shared/comp/x.ts");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create a temporary workspace with an empty shared tree.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(SHARED_DIR))
            .unwrap_or_else(|e| panic!("TestWorkspace::new: failed to create shared dir: {e}"));
        Self { temp_dir }
    }

    /// Builder form of [`add_client`](Self::add_client).
    pub fn with_client(self, name: &str) -> Self {
        self.add_client(name);
        self
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn shared_path(&self, rel: &str) -> PathBuf {
        self.root().join(SHARED_DIR).join(rel)
    }

    /// Path of `rel` inside the mirror of `client`.
    pub fn mirror_path(&self, client: &str, rel: &str) -> PathBuf {
        self.mirror_root(client).join(rel)
    }

    pub fn mirror_root(&self, client: &str) -> PathBuf {
        self.root().join("clients").join(client).join(MIRROR_SUBDIR)
    }

    /// Create the client directory (not its mirror).
    pub fn add_client(&self, name: &str) -> PathBuf {
        let dir = self.root().join("clients").join(name);
        fs::create_dir_all(&dir)
            .unwrap_or_else(|e| panic!("add_client: failed to create {}: {e}", dir.display()));
        dir
    }

    /// Write a file anywhere in the workspace, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        write_file(&path, content);
        path
    }

    /// Write a file into the shared tree, creating parent directories.
    pub fn write_shared(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.shared_path(rel);
        write_file(&path, content);
        path
    }

    /// Write a file straight into a client mirror.
    pub fn write_mirror(&self, client: &str, rel: &str, content: &str) -> PathBuf {
        let path = self.mirror_path(client, rel);
        write_file(&path, content);
        path
    }

    pub fn create_shared_dir(&self, rel: &str) -> PathBuf {
        let path = self.shared_path(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn remove_shared(&self, rel: &str) {
        let path = self.shared_path(rel);
        if path.is_dir() {
            fs::remove_dir_all(&path).unwrap();
        } else {
            fs::remove_file(&path).unwrap();
        }
    }

    /// Set the modification time of `path`.
    pub fn set_mtime(&self, path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .and_then(|file| file.set_modified(time))
            .unwrap_or_else(|e| panic!("set_mtime: failed for {}: {e}", path.display()));
    }

    /// Push the modification time of `path` `secs` seconds into the past.
    pub fn age(&self, path: &Path, secs: u64) {
        self.set_mtime(path, SystemTime::now() - Duration::from_secs(secs));
    }

    pub fn age_shared(&self, rel: &str, secs: u64) {
        self.age(&self.shared_path(rel), secs);
    }

    /// Move the modification time of `path` `secs` seconds into the future.
    pub fn touch_ahead(&self, path: &Path, secs: u64) {
        self.set_mtime(path, SystemTime::now() + Duration::from_secs(secs));
    }

    pub fn mtime(&self, path: &Path) -> SystemTime {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .unwrap_or_else(|e| panic!("mtime: failed for {}: {e}", path.display()))
    }

    /// Read `rel` (relative to root) as text.
    pub fn read(&self, rel: &str) -> String {
        let path = self.path(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Record every file under `dir` with its contents and mtime.
    pub fn snapshot(&self, dir: &Path) -> TreeSnapshot {
        WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let rel = entry
                    .path()
                    .strip_prefix(dir)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/");
                let content = fs::read(entry.path()).unwrap();
                (rel, (content, self.mtime(entry.path())))
            })
            .collect()
    }

    /// Assert that `rel` (relative to the workspace root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `rel` (relative to the workspace root) does **not** exist.
    pub fn assert_file_not_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `rel` has exactly `content`.
    pub fn assert_file_content(&self, rel: &str, content: &str) {
        let actual = self.read(rel);
        assert_eq!(
            actual, content,
            "File {} has unexpected content",
            self.path(rel).display()
        );
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content)
        .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
}
