//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace `path` with `content` in one step.
    ///
    /// Readers see either the old file or the complete new one, never a
    /// truncated file. An existing destination keeps its permissions and a
    /// symlinked destination is written through to its target.
    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// All files below `dir` with the given extension, sorted by path.
    fn manifest_files(&self, dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()> {
        let target = match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => std::fs::canonicalize(path)?,
            _ => path.to_path_buf(),
        };
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Plain open so a new file gets the umask-derived mode, not 0600.
        let mut tmp = tempfile::Builder::new()
            .prefix(".staticfs-gen")
            .make_in(dir, |p| OpenOptions::new().write(true).create_new(true).open(p))?;
        if let Ok(meta) = std::fs::metadata(&target) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| e.error)?;
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn manifest_files(&self, dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() && entry.path().extension() == Some(OsStr::new(extension))
            {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_existing_file_when_write_atomic_then_replaces_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.c");
        std::fs::write(&path, "old").unwrap();

        RealFileSystem.write_atomic(&path, "new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        let leftovers = std::fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temporary file should be gone");
    }

    #[cfg(unix)]
    #[test]
    fn given_existing_file_when_write_atomic_then_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.c");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        RealFileSystem.write_atomic(&path, "new").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn given_new_file_when_write_atomic_then_matches_plain_create_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let reference = temp.path().join("reference.c");
        std::fs::write(&reference, "").unwrap();
        let path = temp.path().join("out.c");

        RealFileSystem.write_atomic(&path, "new").unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&path), mode(&reference));
    }

    #[cfg(unix)]
    #[test]
    fn given_symlinked_destination_when_write_atomic_then_writes_through() {
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("real.c");
        let link = temp.path().join("link.c");
        std::fs::write(&real, "old").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        RealFileSystem.write_atomic(&link, "new").unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "new");
    }

    #[test]
    fn given_nested_manifests_when_listing_then_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("b")).unwrap();
        std::fs::write(temp.path().join("b/z.fs"), "").unwrap();
        std::fs::write(temp.path().join("a.fs"), "").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "").unwrap();

        let files = RealFileSystem.manifest_files(temp.path(), "fs").unwrap();

        assert_eq!(
            files,
            vec![temp.path().join("a.fs"), temp.path().join("b/z.fs")]
        );
    }
}
