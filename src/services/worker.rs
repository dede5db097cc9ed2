use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::clients::{ClientError, PolishClient, TranscriptionClient};
use crate::config::settings::{PipelineConfig, PolishConfig, QueueConfig};
use crate::db::repositories::{JobRepository, LexiconRepository};
use crate::lexicon::cache::LexiconCache;
use crate::models::job::{FailureReason, Job};
use crate::models::lexicon::CompiledLexicon;
use crate::pipeline;
use crate::queue::JobQueue;
use crate::storage::ObjectStore;
use crate::utils::mime_utils::get_mime_type_from_filename;

/// C7: the worker loop. Each iteration dequeues one job, runs it end-to-end, and always
/// resolves it to a terminal state — a panic inside a single iteration would otherwise
/// leave the row stuck in PROCESSING until the orphan sweep reclaims it.
pub struct Worker {
    queue: Arc<JobQueue>,
    job_repository: Arc<JobRepository>,
    lexicon_repository: Arc<LexiconRepository>,
    lexicon_cache: Arc<LexiconCache>,
    storage: Arc<ObjectStore>,
    transcription_client: Arc<dyn TranscriptionClient>,
    polish_client: Arc<dyn PolishClient>,
    pipeline_config: PipelineConfig,
    polish_config: PolishConfig,
    queue_config: QueueConfig,
}

impl Worker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue: Arc<JobQueue>,
        job_repository: Arc<JobRepository>,
        lexicon_repository: Arc<LexiconRepository>,
        lexicon_cache: Arc<LexiconCache>,
        storage: Arc<ObjectStore>,
        transcription_client: Arc<dyn TranscriptionClient>,
        polish_client: Arc<dyn PolishClient>,
        pipeline_config: PipelineConfig,
        polish_config: PolishConfig,
        queue_config: QueueConfig,
    ) -> Self {
        Self {
            queue,
            job_repository,
            lexicon_repository,
            lexicon_cache,
            storage,
            transcription_client,
            polish_client,
            pipeline_config,
            polish_config,
            queue_config,
        }
    }

    /// Runs forever, processing one job per iteration. Intended to be spawned once per
    /// configured worker slot (`QueueConfig::worker_count`).
    pub async fn run_forever(self: Arc<Self>) {
        loop {
            match self.queue.dequeue().await {
                Ok(job) => {
                    let job_id = job.id;
                    if let Err(e) = self.process(job).await {
                        error!("worker failed to resolve job {}: {}", job_id, e);
                    }
                }
                Err(e) => {
                    error!("worker failed to dequeue: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    async fn process(&self, job: Job) -> Result<(), crate::error::AppError> {
        let budget = Duration::from_secs(self.queue_config.job_timeout_secs);
        match tokio::time::timeout(budget, self.run_job(&job)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reason)) => {
                self.job_repository.fail(job.id, reason.as_str()).await?;
                Ok(())
            }
            Err(_) => {
                warn!("job {} exceeded its processing budget of {:?}", job.id, budget);
                self.job_repository.fail(job.id, FailureReason::Stuck.as_str()).await?;
                Ok(())
            }
        }
    }

    async fn run_job(&self, job: &Job) -> Result<(), FailureReason> {
        let audio_bytes = self.storage.read(&job.audio_path).await.map_err(|e| {
            warn!("job {}: failed to read audio blob: {}", job.id, e);
            FailureReason::MissingAudio
        })?;

        let mime_type = get_mime_type_from_filename(&format!("audio.{}", job.audio_format))
            .unwrap_or("application/octet-stream");

        let raw_text = self
            .transcription_client
            .transcribe(&audio_bytes, &job.audio_path, mime_type, job.language.as_deref())
            .await
            .map_err(classify_transcription_error)?;

        if let Err(e) = self.job_repository.set_raw_transcript(job.id, &raw_text).await {
            warn!("job {}: failed to persist raw transcript: {}", job.id, e);
        }

        let lexicon = match &job.lexicon_id {
            Some(lexicon_id) => self
                .lexicon_cache
                .get_or_compile(&self.lexicon_repository, lexicon_id)
                .await
                .unwrap_or_else(|e| {
                    warn!("job {}: lexicon '{}' failed to compile, proceeding without it: {}", job.id, lexicon_id, e);
                    Arc::new(CompiledLexicon {
                        lexicon_id: lexicon_id.clone(),
                        entries: vec![],
                    })
                }),
            None => Arc::new(CompiledLexicon {
                lexicon_id: String::new(),
                entries: vec![],
            }),
        };

        let (processed_text, metrics) = pipeline::run(
            &raw_text,
            &lexicon,
            job.language.as_deref(),
            &self.pipeline_config,
            self.polish_client.as_ref(),
            self.polish_config.timeout_secs,
        )
        .await;

        let completed = self
            .job_repository
            .complete(job.id, &processed_text, &metrics)
            .await
            .map_err(|e| {
                error!("job {}: failed to persist completion: {}", job.id, e);
                FailureReason::Internal
            })?;

        if !completed {
            warn!("job {}: completion update matched zero rows (already resolved?)", job.id);
        }

        if let Err(e) = self.storage.delete(&job.audio_path).await {
            warn!("job {}: failed to delete audio blob after completion: {}", job.id, e);
        }

        info!(
            "job {} completed: confidence={:.3}, exact={}, fuzzy={}",
            job.id, metrics.confidence_score, metrics.exact_match_count, metrics.fuzzy_match_count
        );

        Ok(())
    }
}

fn classify_transcription_error(err: ClientError) -> FailureReason {
    match err {
        ClientError::Quota(_) => FailureReason::QuotaExceeded,
        ClientError::FormatRejected(_) => FailureReason::AudioDecode,
        ClientError::InvalidKey(_)
        | ClientError::RateLimit { .. }
        | ClientError::Timeout(_)
        | ClientError::Network(_)
        | ClientError::Server5xx(_)
        | ClientError::Unexpected(_) => FailureReason::RecognizerError,
    }
}
