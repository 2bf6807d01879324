//! File storage collaborator.
//!
//! Stores opaque payloads under a logical bucket (e.g.
//! `submissions/papers`) and hands back a reference string the database can
//! carry. The core never inspects file bytes. Deletion by reference is
//! idempotent: removing a missing file is not an error.

use std::path::PathBuf;
use uuid::Uuid;

#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn ensure_root(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Store a payload and return its opaque reference
    /// (`<bucket>/<uuid>_<filename>`).
    pub fn store(&self, bucket: &str, filename: &str, bytes: &[u8]) -> std::io::Result<String> {
        let dir = self.root.join(bucket);
        std::fs::create_dir_all(&dir)?;

        let name = format!("{}_{}", Uuid::new_v4(), sanitize(filename));
        let path = dir.join(&name);
        std::fs::write(&path, bytes)?;

        Ok(format!("{}/{}", bucket, name))
    }

    /// Remove a stored file by reference. Missing files are ignored.
    pub fn delete(&self, reference: &str) {
        if reference.contains("..") {
            return;
        }
        let path = self.root.join(reference);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("failed to delete stored file {}: {}", reference, e),
        }
    }

    pub fn path(&self, reference: &str) -> PathBuf {
        self.root.join(reference)
    }
}

/// Keep only the final path component and drop characters that could
/// escape the bucket directory.
fn sanitize(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("file")
        .replace("..", "");
    if base.is_empty() {
        "file".to_string()
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_and_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let reference = store
            .store("submissions/papers", "paper.pdf", b"%PDF-1.4")
            .unwrap();
        assert!(reference.starts_with("submissions/papers/"));
        assert!(reference.ends_with("_paper.pdf"));
        assert!(store.path(&reference).exists());

        store.delete(&reference);
        assert!(!store.path(&reference).exists());

        // Idempotent: deleting again is not an error.
        store.delete(&reference);
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize("../../etc/passwd"), "passwd");
        assert_eq!(sanitize("dir/paper.pdf"), "paper.pdf");
        assert_eq!(sanitize("..ibberish.."), "ibberish");
        assert_eq!(sanitize(""), "file");
    }

    #[test]
    fn distinct_references_for_same_filename() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let a = store.store("b", "x.pdf", b"a").unwrap();
        let b = store.store("b", "x.pdf", b"b").unwrap();
        assert_ne!(a, b);
    }
}
