//! Filesystem removal primitives used by the cleanup actions.
//!
//! Paths that no longer exist are skipped, so removing the same path twice
//! is never an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Outcome of removing a batch of paths.
#[derive(Debug, Default, Clone)]
pub struct RemoveReport {
    /// Number of paths actually removed.
    pub removed: usize,
    /// Bytes of regular files under the removed paths.
    pub freed_bytes: u64,
    /// Paths that could not be removed.
    pub failed: Vec<PathBuf>,
}

impl RemoveReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, path: &Path, result: io::Result<Option<u64>>) {
        match result {
            Ok(Some(freed)) => {
                self.removed += 1;
                self.freed_bytes += freed;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Failed to remove {}: {}", path.display(), e);
                self.failed.push(path.to_path_buf());
            }
        }
    }
}

/// Recursively remove every folder in `paths`.
///
/// All paths are attempted even after a failure; nothing is restored.
pub fn remove_folders<P: AsRef<Path>>(paths: &[P]) -> RemoveReport {
    let mut report = RemoveReport::default();
    for path in paths {
        let path = path.as_ref();
        report.record(path, remove_tree(path));
    }
    report
}

/// Remove every file in `paths`, attempting all of them.
pub fn remove_files<P: AsRef<Path>>(paths: &[P]) -> RemoveReport {
    let mut report = RemoveReport::default();
    for path in paths {
        let path = path.as_ref();
        report.record(path, remove_file(path));
    }
    report
}

/// Remove every folder link in `links` without touching what they point to.
pub fn remove_folder_links<P: AsRef<Path>>(links: &[P]) -> RemoveReport {
    let mut report = RemoveReport::default();
    for link in links {
        let link = link.as_ref();
        report.record(link, remove_link(link));
    }
    report
}

/// Remove a single file. Returns `None` when it does not exist.
pub fn remove_file(path: &Path) -> io::Result<Option<u64>> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    fs::remove_file(path)?;
    Ok(Some(meta.len()))
}

fn remove_tree(path: &Path) -> io::Result<Option<u64>> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    if meta.is_dir() {
        let size = dir_size(path);
        fs::remove_dir_all(path)?;
        Ok(Some(size))
    } else {
        fs::remove_file(path)?;
        Ok(Some(meta.len()))
    }
}

fn remove_link(link: &Path) -> io::Result<Option<u64>> {
    let meta = match fs::symlink_metadata(link) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    if meta.file_type().is_symlink() {
        // Directory symlinks and junctions on Windows need remove_dir
        fs::remove_file(link).or_else(|_| fs::remove_dir(link))?;
    } else if meta.is_dir() {
        // Only an empty placeholder may stand where a link was expected
        fs::remove_dir(link)?;
    } else {
        fs::remove_file(link)?;
    }
    Ok(Some(0))
}

fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn removes_folders_and_counts_bytes() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b/nested");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("lib.a"), "x".repeat(500)).unwrap();
        fs::write(b.join("lib.a"), "x".repeat(300)).unwrap();

        let report = remove_folders(&[a.clone(), tmp.path().join("b")]);

        assert!(report.is_success());
        assert_eq!(report.removed, 2);
        assert_eq!(report.freed_bytes, 800);
        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn removing_same_folder_twice_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        fs::create_dir(&out).unwrap();

        let report = remove_folders(&[out.clone(), out.clone()]);

        assert!(report.is_success());
        assert_eq!(report.removed, 1);
    }

    #[test]
    fn empty_batch_succeeds() {
        let paths: Vec<PathBuf> = vec![];
        assert!(remove_folders(&paths).is_success());
        assert!(remove_files(&paths).is_success());
        assert!(remove_folder_links(&paths).is_success());
    }

    #[test]
    fn missing_file_is_skipped() {
        let tmp = TempDir::new().unwrap();
        assert!(remove_file(&tmp.path().join("gone.txt")).unwrap().is_none());
    }

    #[test]
    fn link_placeholder_with_content_fails() {
        let tmp = TempDir::new().unwrap();
        let not_a_link = tmp.path().join("third_party");
        fs::create_dir(&not_a_link).unwrap();
        fs::write(not_a_link.join("keep.h"), "").unwrap();

        let report = remove_folder_links(&[not_a_link.clone()]);

        assert!(!report.is_success());
        assert_eq!(report.failed, vec![not_a_link.clone()]);
        assert!(not_a_link.join("keep.h").exists());
    }

    #[cfg(unix)]
    #[test]
    fn removes_link_but_keeps_target() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("real");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("file.h"), "").unwrap();
        let link = tmp.path().join("linked");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let report = remove_folder_links(&[link.clone()]);

        assert!(report.is_success());
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(target.join("file.h").exists());
    }
}
