//! Filesystem utilities.
//!
//! Helpers that map `std::io::Error` onto [`CoreError::Filesystem`] so callers
//! get the offending path in the error message.

use crate::error::CoreError;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Ensures that a directory exists at the given path, creating parents as needed.
///
/// # Errors
///
/// Fails if the path exists but is not a directory, or if creation fails.
///
/// # Examples
///
/// ```no_run
/// # use procwatch_core::utils::fs::ensure_dir_exists;
/// # use tempfile::tempdir;
/// let temp_dir = tempdir().unwrap();
/// let dir_path = temp_dir.path().join("custom_icons");
/// ensure_dir_exists(&dir_path).unwrap();
/// assert!(dir_path.is_dir());
/// ```
pub fn ensure_dir_exists(path: &Path) -> Result<(), CoreError> {
    if path.exists() {
        if path.is_dir() {
            Ok(())
        } else {
            Err(CoreError::Filesystem {
                message: "Path exists but is not a directory".to_string(),
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "Path exists but is not a directory"),
            })
        }
    } else {
        fs::create_dir_all(path).map_err(|e| CoreError::Filesystem {
            message: "Failed to create directory".to_string(),
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Reads a whole file as raw bytes.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, CoreError> {
    fs::read(path).map_err(|e| CoreError::Filesystem {
        message: "Failed to read file".to_string(),
        path: path.to_path_buf(),
        source: e,
    })
}

/// Returns the modification time of `path`, or `None` if it does not exist.
pub fn modified_time(path: &Path) -> Result<Option<SystemTime>, CoreError> {
    match fs::metadata(path) {
        Ok(meta) => meta.modified().map(Some).map_err(|e| CoreError::Filesystem {
            message: "Failed to read modification time".to_string(),
            path: path.to_path_buf(),
            source: e,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CoreError::Filesystem {
            message: "Failed to stat file".to_string(),
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `content` to `path` through a sibling `.tmp` file and a rename.
///
/// The parent directory is created if missing.
pub fn write_string_atomically(path: &Path, content: &str) -> Result<(), CoreError> {
    write_bytes_atomically(path, content.as_bytes())
}

/// Byte-level variant of [`write_string_atomically`], for files that may hold
/// lines which are not valid UTF-8.
pub fn write_bytes_atomically(path: &Path, content: &[u8]) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir_exists(parent)?;
        }
    }

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).ok_or_else(|| {
        CoreError::InvalidInput(format!("Cannot write to a path without a file name: {:?}", path))
    })?;
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, content).map_err(|e| CoreError::Filesystem {
        message: "Failed to write temporary file".to_string(),
        path: tmp_path.clone(),
        source: e,
    })?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CoreError::Filesystem {
            message: "Failed to replace file".to_string(),
            path: path.to_path_buf(),
            source: e,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_exists_creates_nested() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir_exists(&nested).unwrap();
    }

    #[test]
    fn test_ensure_dir_exists_rejects_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(ensure_dir_exists(&file), Err(CoreError::Filesystem { .. })));
    }

    #[test]
    fn test_modified_time_missing_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(modified_time(&temp.path().join("missing")).unwrap().is_none());
        let file = temp.path().join("present");
        fs::write(&file, "x").unwrap();
        assert!(modified_time(&file).unwrap().is_some());
    }

    #[test]
    fn test_read_bytes_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = read_bytes(&temp.path().join("missing.png")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_write_string_atomically_replaces_content() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("sub/block_list.txt");
        write_string_atomically(&target, "first\n").unwrap();
        write_string_atomically(&target, "second\n").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "second\n");
        assert!(!temp.path().join("sub/block_list.txt.tmp").exists());
    }

    #[test]
    fn test_write_bytes_atomically_keeps_non_utf8_bytes() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("allow_list.txt");
        let content = b"/opt/caf\xe9/run\n/usr/bin/top\n";
        write_bytes_atomically(&target, content).unwrap();
        assert_eq!(read_bytes(&target).unwrap(), content.to_vec());
    }
}
