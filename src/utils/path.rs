//! Filesystem path helpers.

use std::path::{Path, PathBuf};

/// Absolute form of `path`, resolving symlinks when it exists.
///
/// `canonicalize` fails for paths that do not exist yet; those fall back
/// to anchoring at the current directory.
pub fn absolutize(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_relative_path_is_anchored() {
        let out = absolutize(Path::new("does/not/exist.toml"));
        assert!(out.is_absolute());
        assert!(out.ends_with("does/not/exist.toml"));
    }

    #[test]
    fn test_missing_absolute_path_kept() {
        let out = absolutize(Path::new("/nope/thumbex.toml"));
        assert_eq!(out, PathBuf::from("/nope/thumbex.toml"));
    }

    #[test]
    fn test_existing_path_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("thumbex.toml");
        fs::write(&file, "").unwrap();
        assert_eq!(absolutize(&file), file.canonicalize().unwrap());
    }
}
