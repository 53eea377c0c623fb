//! Mapping request URLs onto the served directory.

use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// Map a request URL to a file under `root`.
///
/// Strips the query string, percent-decodes, and refuses anything that
/// would land outside the root (dot-dot segments, symlinks pointing
/// out). Directory URLs resolve to their `index.html`.
pub fn resolve(url: &str, root: &Path) -> Option<PathBuf> {
    let rel = decode(url)?;
    if rel.split('/').any(|segment| segment == "..") {
        return None;
    }

    // Canonicalizing both sides catches escapes the dot-dot check
    // cannot, e.g. a symlink inside the root pointing elsewhere
    let target = root.join(&rel).canonicalize().ok()?;
    if !target.starts_with(root.canonicalize().ok()?) {
        return None;
    }

    if target.is_dir() {
        let index = target.join("index.html");
        return index.is_file().then_some(index);
    }
    target.is_file().then_some(target)
}

/// Percent-decoded path component of the URL, without the query string
/// or surrounding slashes.
fn decode(url: &str) -> Option<String> {
    let path = url.split('?').next().unwrap_or(url);
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    Some(decoded.trim_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.json"), "{}").unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::create_dir(dir.path().join("sets")).unwrap();
        fs::write(dir.path().join("sets").join("car.svg"), "<svg/>").unwrap();
        dir
    }

    #[test]
    fn test_resolve_file() {
        let dir = fixture();
        let resolved = resolve("/data.json", dir.path()).unwrap();
        assert!(resolved.ends_with("data.json"));
    }

    #[test]
    fn test_resolve_nested_file() {
        let dir = fixture();
        let resolved = resolve("/sets/car.svg", dir.path()).unwrap();
        assert!(resolved.ends_with("sets/car.svg"));
    }

    #[test]
    fn test_resolve_directory_index() {
        let dir = fixture();
        let resolved = resolve("/", dir.path()).unwrap();
        assert!(resolved.ends_with("index.html"));
    }

    #[test]
    fn test_query_string_stripped() {
        let dir = fixture();
        assert!(resolve("/data.json?v=2", dir.path()).is_some());
    }

    #[test]
    fn test_percent_decoding() {
        let dir = fixture();
        assert!(resolve("/data%2Ejson", dir.path()).is_some());
    }

    #[test]
    fn test_traversal_rejected() {
        let dir = fixture();
        assert!(resolve("/../etc/passwd", dir.path()).is_none());
        assert!(resolve("/%2E%2E/etc/passwd", dir.path()).is_none());
    }

    #[test]
    fn test_missing_file() {
        let dir = fixture();
        assert!(resolve("/absent.json", dir.path()).is_none());
    }

    #[test]
    fn test_directory_without_index() {
        let dir = fixture();
        assert!(resolve("/sets", dir.path()).is_none());
    }
}
