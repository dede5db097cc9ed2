pub mod feedback_service;
pub mod submission_service;
pub mod sweep;
pub mod worker;

pub use feedback_service::FeedbackService;
pub use submission_service::SubmissionService;
pub use worker::Worker;
