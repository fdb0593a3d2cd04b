//! Directory guard: checks that a store file's directory exists before the
//! store touches it.

use std::path::{Path, PathBuf};

/// Directory that must exist for `path` to be readable or writable.
///
/// A bare file name (no parent component) lives in the current directory.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether the parent directory of `path` exists and is a directory.
///
/// Never creates anything. A `false` here makes the store fall back to
/// in-memory defaults rather than fail.
pub async fn ensure_ready(path: &Path) -> bool {
    tokio::fs::metadata(parent_dir(path))
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn existing_parent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_ready(&dir.path().join("a.json")).await);
    }

    #[tokio::test]
    async fn missing_parent_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("db");
        assert!(!ensure_ready(&missing.join("a.json")).await);
        assert!(!missing.exists());
    }

    #[tokio::test]
    async fn parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("db");
        std::fs::write(&file, b"").unwrap();
        assert!(!ensure_ready(&file.join("a.json")).await);
    }

    #[test]
    fn bare_name_uses_cwd() {
        assert_eq!(parent_dir(Path::new("a.json")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("/k/db/a.json")), PathBuf::from("/k/db"));
    }
}
