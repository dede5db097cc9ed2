use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::error::AppError;

/// Object store for uploaded audio blobs. Files are named `<job_id>.<ext>` directly
/// under the configured root; every access path is canonicalized and checked to still
/// live under that root before any read/write/delete, rejecting path traversal.
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn ensure_root(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn path_for(&self, job_id: Uuid, extension: &str) -> PathBuf {
        self.root.join(format!("{}.{}", job_id, extension))
    }

    /// Returns the relative key stored on the job row (`audio_path`), not an absolute path,
    /// so the storage root can move between deployments without a migration.
    pub async fn write(&self, job_id: Uuid, extension: &str, bytes: &[u8]) -> Result<String, AppError> {
        self.ensure_root().await?;
        let path = self.path_for(job_id, extension);
        fs::write(&path, bytes).await?;
        Ok(format!("{}.{}", job_id, extension))
    }

    pub async fn read(&self, audio_path: &str) -> Result<Vec<u8>, AppError> {
        let resolved = self.resolve(audio_path)?;
        match fs::read(&resolved).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::Storage(format!("Missing audio blob: {}", audio_path)))
            }
            Err(e) => Err(AppError::Storage(e.to_string())),
        }
    }

    /// Best-effort delete; callers log and swallow failures rather than fail the job.
    pub async fn delete(&self, audio_path: &str) -> Result<(), AppError> {
        let resolved = self.resolve(audio_path)?;
        match fs::remove_file(&resolved).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(e.to_string())),
        }
    }

    fn resolve(&self, audio_path: &str) -> Result<PathBuf, AppError> {
        if audio_path.contains("..") || Path::new(audio_path).is_absolute() {
            return Err(AppError::BadRequest("Invalid audio path".to_string()));
        }
        Ok(self.root.join(audio_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_read_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let job_id = Uuid::new_v4();

        let key = store.write(job_id, "wav", b"RIFF....").await.unwrap();
        assert_eq!(key, format!("{}.wav", job_id));

        let bytes = store.read(&key).await.unwrap();
        assert_eq!(bytes, b"RIFF....");

        store.delete(&key).await.unwrap();
        assert!(store.read(&key).await.is_err());
    }

    #[tokio::test]
    async fn rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let result = store.read("../../etc/passwd").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
