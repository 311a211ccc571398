use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const SCRATCH_PREFIX: &str = "mega_";

/// Job-local directory holding the downloaded artifact until cleanup.
///
/// [`ScratchDir::cleanup`] is the normal exit path. If a job unwinds before
/// reaching it, `Drop` removes the directory synchronously.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    removed: bool,
}

impl ScratchDir {
    pub async fn create(root: &Path) -> io::Result<Self> {
        let path = root.join(format!("{SCRATCH_PREFIX}{}", Uuid::new_v4().simple()));
        tokio::fs::create_dir_all(&path).await?;
        debug!(path = %path.display(), "Created scratch directory");

        Ok(Self {
            path,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Best-effort removal of `file` and then the whole directory.
    ///
    /// Errors are logged and swallowed; calling this again is a no-op.
    pub async fn cleanup(&mut self, file: Option<&Path>) {
        if self.removed {
            return;
        }

        if let Some(file) = file {
            match tokio::fs::remove_file(file).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %file.display(), error = %e, "Failed to remove downloaded file"),
            }
        }

        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "Removed scratch directory"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove scratch directory"),
        }

        self.removed = true;
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.removed {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn directories_are_unique_and_prefixed() {
        let root = tempfile::tempdir().unwrap();
        let a = ScratchDir::create(root.path()).await.unwrap();
        let b = ScratchDir::create(root.path()).await.unwrap();

        assert_ne!(a.path(), b.path());
        assert!(a.path().is_dir());
        let name = a.path().file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("mega_"), "{name}");
    }

    #[tokio::test]
    async fn cleanup_removes_file_and_directory_and_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let mut scratch = ScratchDir::create(root.path()).await.unwrap();
        let file = scratch.path().join("movie.mkv");
        std::fs::write(&file, b"data").unwrap();
        let dir = scratch.path().to_path_buf();

        scratch.cleanup(Some(&file)).await;
        scratch.cleanup(Some(&file)).await;

        assert!(!file.exists());
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn cleanup_tolerates_a_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let mut scratch = ScratchDir::create(root.path()).await.unwrap();
        std::fs::remove_dir_all(scratch.path()).unwrap();

        let missing = scratch.path().join("gone.bin");
        scratch.cleanup(Some(&missing)).await;

        assert!(!scratch.path().exists());
    }

    #[tokio::test]
    async fn drop_removes_directory_when_cleanup_was_skipped() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(root.path()).await.unwrap();
        std::fs::write(scratch.path().join("left.bin"), b"x").unwrap();
        let dir = scratch.path().to_path_buf();

        drop(scratch);

        assert!(!dir.exists());
    }
}
