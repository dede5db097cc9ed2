use std::sync::Arc;

use crate::config::AppSettings;
use crate::db::repositories::{ApiKeyRepository, FeedbackRepository, JobRepository, LexiconRepository};
use crate::lexicon::cache::LexiconCache;
use crate::queue::JobQueue;
use crate::storage::ObjectStore;

/// Shared, cloneable application state handed to every handler via `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<AppSettings>,
    pub api_key_repository: Arc<ApiKeyRepository>,
    pub job_repository: Arc<JobRepository>,
    pub lexicon_repository: Arc<LexiconRepository>,
    pub feedback_repository: Arc<FeedbackRepository>,
    pub queue: Arc<JobQueue>,
    pub lexicon_cache: Arc<LexiconCache>,
    pub storage: Arc<ObjectStore>,
}
