pub mod api_key;
pub mod app_state;
pub mod feedback;
pub mod job;
pub mod lexicon;
pub mod pipeline_metrics;

pub use api_key::{ApiKey, AuthenticatedApiKey};
pub use app_state::AppState;
pub use feedback::{Feedback, FeedbackListFilter, FeedbackStatus, FeedbackView};
pub use job::{FailureReason, Job, JobCreatedView, JobStatus, JobView};
pub use lexicon::{CompiledLexicon, LexiconTerm, NewLexiconTerm, UpdateLexiconTerm};
pub use pipeline_metrics::PipelineMetrics;
