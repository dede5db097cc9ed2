use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::StreamExt;
use tracing::instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::api_key::AuthenticatedApiKey;
use crate::models::app_state::AppState;
use crate::models::job::JobView;
use crate::services::submission_service::SubmissionService;

struct SubmittedAudio {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
    lexicon_id: Option<String>,
    language: Option<String>,
}

/// Streams a multipart submission field-by-field, accumulating the audio bytes and the
/// optional `lexicon_id`/`language` text fields (spec.md §4.1/§6).
async fn read_submission(mut payload: Multipart) -> Result<SubmittedAudio, AppError> {
    let mut filename = String::from("audio.bin");
    let mut content_type = None;
    let mut bytes = Vec::new();
    let mut lexicon_id = None;
    let mut language = None;
    let mut saw_file = false;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let disposition = field
            .content_disposition()
            .cloned()
            .ok_or_else(|| AppError::BadRequest("multipart field missing Content-Disposition".to_string()))?;
        let field_name = disposition
            .get_name()
            .ok_or_else(|| AppError::BadRequest("multipart field missing name".to_string()))?
            .to_string();

        match field_name.as_str() {
            "file" => {
                saw_file = true;
                if let Some(name) = disposition.get_filename() {
                    filename = name.to_string();
                }
                content_type = field.content_type().map(|m| m.to_string());
                while let Some(chunk) = field.next().await {
                    bytes.extend_from_slice(&chunk?);
                }
            }
            "lexicon_id" => {
                let mut buf = Vec::new();
                while let Some(chunk) = field.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                let value = String::from_utf8_lossy(&buf).trim().to_string();
                if !value.is_empty() {
                    lexicon_id = Some(value);
                }
            }
            "language" => {
                let mut buf = Vec::new();
                while let Some(chunk) = field.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                let value = String::from_utf8_lossy(&buf).trim().to_string();
                if !value.is_empty() {
                    language = Some(value);
                }
            }
            _ => {}
        }
    }

    if !saw_file {
        return Err(AppError::BadRequest("missing 'file' field in multipart body".to_string()));
    }

    Ok(SubmittedAudio {
        filename,
        content_type,
        bytes,
        lexicon_id,
        language,
    })
}

#[instrument(skip(state, payload, identity))]
pub async fn submit_job(
    state: web::Data<AppState>,
    payload: Multipart,
    identity: AuthenticatedApiKey,
) -> Result<HttpResponse, AppError> {
    let submission = read_submission(payload).await?;

    let service = SubmissionService::new(
        state.job_repository.clone(),
        state.storage.clone(),
        state.queue.clone(),
        state.settings.storage.clone(),
    );

    let view = service
        .submit(
            identity.api_key_id,
            &submission.filename,
            submission.content_type.as_deref(),
            submission.bytes,
            submission.lexicon_id.as_deref(),
            submission.language.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Accepted().json(view))
}

#[instrument(skip(state, identity))]
pub async fn get_job(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: AuthenticatedApiKey,
) -> Result<HttpResponse, AppError> {
    let job_id = path.into_inner();
    let job = state
        .job_repository
        .find_for_owner(job_id, identity.api_key_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job not found: {}", job_id)))?;

    Ok(HttpResponse::Ok().json(JobView::from(job)))
}
