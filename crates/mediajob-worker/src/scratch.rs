//! Per-job scratch directories.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use mediajob_models::JobId;

/// A job's private working directory, removed when dropped.
///
/// Every exit path of a job drops its scratch space, so downloads and
/// intermediate files never outlive the job.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    /// Create `<root>/job-<job_id>-XXXXXX`, creating `root` if needed.
    pub fn create(root: &Path, job_id: &JobId) -> std::io::Result<Self> {
        std::fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("job-{}-", job_id))
            .tempdir_in(root)?;

        debug!(job_id = %job_id, "Created scratch space {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the scratch space.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Delete one file now instead of waiting for the whole directory.
    pub async fn discard(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }

    /// Remove the directory, reporting failures instead of ignoring them.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove scratch space {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let job_id = JobId::from_string("job-a");

        let path = {
            let scratch = ScratchSpace::create(root.path(), &job_id).unwrap();
            std::fs::write(scratch.file("job-a_input.mp3"), b"data").unwrap();
            assert!(scratch
                .path()
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("job-job-a-"));
            scratch.path().to_path_buf()
        };

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_discard_and_close() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::create(&root.path().join("nested"), &JobId::new()).unwrap();
        let file = scratch.file("x");
        std::fs::write(&file, b"1").unwrap();

        scratch.discard(&file).await;
        assert!(!file.exists());
        scratch.discard(&file).await;

        let path = scratch.path().to_path_buf();
        scratch.close();
        assert!(!path.exists());
    }
}
