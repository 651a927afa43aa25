//! Recursive tree operations: latest modification time, mirroring copies,
//! and pruning of entries that no longer exist on the source side.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::{Error, ReservedArtifacts, Result};

/// Outcome of a [`copy_tree`] call. Paths are relative to the tree root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeCopy {
    /// Files copied into the destination
    pub copied: Vec<PathBuf>,
    /// Source files that vanished between listing and copying
    pub vanished: Vec<PathBuf>,
    /// Entries that could not be copied, with the error message
    pub failed: Vec<(PathBuf, String)>,
}

/// Modification time of a single file, or `None` if it does not exist.
pub fn file_mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Latest modification time over every file under `dir`.
///
/// Returns `None` for a missing or empty directory, which callers treat as
/// time zero. Reserved artifacts are ignored, and entries that vanish
/// mid-walk are skipped.
pub fn latest_mtime(dir: &Path, reserved: &ReservedArtifacts) -> Option<SystemTime> {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| !reserved.contains(entry.path()))
        .filter_map(|entry| entry.metadata().ok()?.modified().ok())
        .max()
}

/// Copy a single file, giving the copy the source's modification time.
///
/// The source mtime is read before the copy, so a source edited mid-copy
/// still compares as newer on the next pass.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    let modified = fs::metadata(src)
        .and_then(|m| m.modified())
        .map_err(|e| Error::io(src, e))?;

    fs::copy(src, dst).map_err(|e| Error::io(dst, e))?;

    let file = File::options()
        .write(true)
        .open(dst)
        .or_else(|_| File::open(dst))
        .map_err(|e| Error::io(dst, e))?;
    file.set_modified(modified).map_err(|e| Error::io(dst, e))?;
    Ok(())
}

/// Recursively copy `src` onto `dst`, overwriting existing files.
///
/// Reserved artifacts are never copied. A failing entry is recorded in
/// [`TreeCopy::failed`] and the copy carries on with the rest of the tree;
/// files that disappear from the source during the walk go to
/// [`TreeCopy::vanished`]. Only an unusable `dst` fails the whole call.
pub fn copy_tree(src: &Path, dst: &Path, reserved: &ReservedArtifacts) -> Result<TreeCopy> {
    let mut outcome = TreeCopy::default();
    fs::create_dir_all(dst).map_err(|e| Error::io(dst, e))?;

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_not_found(&e) => continue,
            Err(e) => {
                let rel = e
                    .path()
                    .and_then(|p| p.strip_prefix(src).ok())
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                outcome.failed.push((rel, e.to_string()));
                continue;
            }
        };

        let rel = match entry.path().strip_prefix(src) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => continue,
        };
        let target = dst.join(&rel);

        if entry.file_type().is_dir() {
            if let Err(e) = fs::create_dir_all(&target) {
                tracing::debug!(path = %rel.display(), error = %e, "cannot create directory");
                outcome.failed.push((rel, Error::io(&target, e).to_string()));
            }
            continue;
        }
        if reserved.contains(entry.path()) {
            continue;
        }

        match copy_file(entry.path(), &target) {
            Ok(()) => {
                tracing::debug!(path = %rel.display(), "copied");
                outcome.copied.push(rel);
            }
            Err(e) if e.is_vanished() && !entry.path().exists() => {
                tracing::debug!(path = %rel.display(), "source vanished during copy");
                outcome.vanished.push(rel);
            }
            Err(e) => {
                tracing::debug!(path = %rel.display(), error = %e, "copy failed");
                outcome.failed.push((rel, e.to_string()));
            }
        }
    }

    Ok(outcome)
}

/// Delete every entry under `mirror` that has no counterpart of the same
/// kind under `source`.
///
/// A mirror file whose source counterpart is missing or is now a directory
/// is removed. A mirror directory whose counterpart is now a file is removed
/// with its contents, and one whose counterpart is gone is removed once
/// empty. Returns the removed file paths relative to `mirror`. A missing
/// `mirror` directory is not an error.
pub fn remove_orphans(mirror: &Path, source: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for entry in WalkDir::new(mirror).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_not_found(&e) => continue,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| mirror.to_path_buf());
                return Err(Error::io(path, e.into()));
            }
        };

        let rel = match entry.path().strip_prefix(mirror) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => continue,
        };
        let counterpart = kind_of(&source.join(&rel));

        if entry.file_type().is_dir() {
            match counterpart {
                Some(Kind::Dir) => {}
                Some(Kind::File) => match fs::remove_dir_all(entry.path()) {
                    Ok(()) => {
                        tracing::debug!(path = %rel.display(), "removed directory replaced by a file");
                    }
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(Error::io(entry.path(), e)),
                },
                None if is_empty_dir(entry.path()) => match fs::remove_dir(entry.path()) {
                    Ok(()) => tracing::debug!(path = %rel.display(), "removed empty directory"),
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(Error::io(entry.path(), e)),
                },
                None => {}
            }
            continue;
        }

        if counterpart == Some(Kind::File) {
            continue;
        }
        remove_if_present(entry.path())?;
        tracing::debug!(path = %rel.display(), "removed orphan");
        removed.push(rel);
    }

    Ok(removed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    File,
    Dir,
}

/// Kind of a source entry, following symlinks like [`copy_tree`] does.
fn kind_of(path: &Path) -> Option<Kind> {
    let meta = fs::metadata(path).ok()?;
    Some(if meta.is_dir() { Kind::Dir } else { Kind::File })
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_none())
}

fn is_not_found(e: &walkdir::Error) -> bool {
    e.io_error().is_some_and(|io| io.kind() == ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReservedNames;
    use std::time::Duration;
    use tempfile::tempdir;

    fn set_mtime(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn artifacts(root: &Path) -> ReservedArtifacts {
        ReservedArtifacts::new(root, ReservedNames::default())
    }

    #[test]
    fn latest_mtime_of_missing_dir_is_none() {
        let dir = tempdir().unwrap();
        assert!(latest_mtime(&dir.path().join("absent"), &artifacts(dir.path())).is_none());
    }

    #[test]
    fn latest_mtime_picks_newest_nested_file() {
        let dir = tempdir().unwrap();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/old.ts"), "old").unwrap();
        fs::write(dir.path().join("a/b/new.ts"), "new").unwrap();
        set_mtime(&dir.path().join("a/old.ts"), base);
        set_mtime(&dir.path().join("a/b/new.ts"), base + Duration::from_secs(60));

        let latest = latest_mtime(dir.path(), &artifacts(dir.path())).unwrap();
        assert_eq!(latest, base + Duration::from_secs(60));
    }

    #[test]
    fn latest_mtime_ignores_artifacts_at_the_root_only() {
        let dir = tempdir().unwrap();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        fs::create_dir_all(dir.path().join("logs")).unwrap();
        fs::write(dir.path().join("x.ts"), "x").unwrap();
        fs::write(dir.path().join(".log"), "{}").unwrap();
        set_mtime(&dir.path().join("x.ts"), base);
        set_mtime(&dir.path().join(".log"), base + Duration::from_secs(3600));
        assert_eq!(latest_mtime(dir.path(), &artifacts(dir.path())), Some(base));

        fs::write(dir.path().join("logs/.log"), "user content").unwrap();
        set_mtime(&dir.path().join("logs/.log"), base + Duration::from_secs(60));
        assert_eq!(
            latest_mtime(dir.path(), &artifacts(dir.path())),
            Some(base + Duration::from_secs(60))
        );
    }

    #[test]
    fn copy_file_preserves_mtime() {
        let dir = tempdir().unwrap();
        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(2_000_000);
        let src = dir.path().join("src.ts");
        let dst = dir.path().join("dst.ts");
        fs::write(&src, "content").unwrap();
        set_mtime(&src, stamp);

        copy_file(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(&dst).unwrap(), "content");
        assert_eq!(file_mtime(&dst), Some(stamp));
    }

    #[test]
    fn remove_orphans_on_missing_mirror_is_noop() {
        let dir = tempdir().unwrap();
        let removed = remove_orphans(&dir.path().join("mirror"), &dir.path().join("src")).unwrap();
        assert!(removed.is_empty());
    }
}
