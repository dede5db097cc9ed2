use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::settings::StorageConfig;
use crate::db::repositories::JobRepository;
use crate::error::AppError;
use crate::models::job::{Job, JobCreatedView};
use crate::queue::JobQueue;
use crate::storage::ObjectStore;
use crate::utils::audio_validation::validate_audio_submission;

/// C6: accepts a submitted audio file, writes its blob, inserts the PENDING job row, and
/// wakes a worker. Validation happens before any write so a rejected submission never
/// touches storage or the database.
pub struct SubmissionService {
    job_repository: Arc<JobRepository>,
    storage: Arc<ObjectStore>,
    queue: Arc<JobQueue>,
    storage_config: StorageConfig,
}

impl SubmissionService {
    pub fn new(
        job_repository: Arc<JobRepository>,
        storage: Arc<ObjectStore>,
        queue: Arc<JobQueue>,
        storage_config: StorageConfig,
    ) -> Self {
        Self {
            job_repository,
            storage,
            queue,
            storage_config,
        }
    }

    #[instrument(skip(self, audio_bytes), fields(filename = %filename, bytes = audio_bytes.len()))]
    pub async fn submit(
        &self,
        api_key_id: Uuid,
        filename: &str,
        content_type: Option<&str>,
        audio_bytes: Vec<u8>,
        lexicon_id: Option<&str>,
        language: Option<&str>,
    ) -> Result<JobCreatedView, AppError> {
        let extension = validate_audio_submission(
            filename,
            content_type,
            audio_bytes.len(),
            self.storage_config.max_audio_bytes as usize,
        )?;

        let job_id = Uuid::new_v4();
        let audio_path = self.storage.write(job_id, &extension, &audio_bytes).await?;

        let job = match self
            .job_repository
            .insert_pending(job_id, api_key_id, lexicon_id, &audio_path, &extension, language)
            .await
        {
            Ok(job) => job,
            Err(err) => {
                if let Err(cleanup_err) = self.storage.delete(&audio_path).await {
                    warn!(
                        "failed to clean up orphaned audio blob {} after insert failure: {}",
                        audio_path, cleanup_err
                    );
                }
                return Err(err);
            }
        };

        self.queue.enqueue(job.id);
        info!("submitted job {} ({} bytes, .{})", job.id, audio_bytes.len(), extension);

        Ok(JobCreatedView {
            job_id: job.id,
            status: job.status.as_str().to_string(),
            created_at: job.created_at,
        })
    }

    pub async fn find_for_owner(&self, job_id: Uuid, api_key_id: Uuid) -> Result<Option<Job>, AppError> {
        self.job_repository.find_for_owner(job_id, api_key_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_config_max_bytes_is_used_verbatim() {
        let config = StorageConfig {
            root: "/tmp".to_string(),
            max_audio_bytes: 1024,
        };
        assert_eq!(config.max_audio_bytes, 1024);
    }
}
