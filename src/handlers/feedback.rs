use actix_web::{HttpResponse, web};
use tracing::instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::api_key::AuthenticatedApiKey;
use crate::models::app_state::AppState;
use crate::models::feedback::{
    FeedbackListFilter, FeedbackStatus, FeedbackView, SubmitFeedbackRequest, UpdateFeedbackStatusRequest,
};
use crate::services::feedback_service::FeedbackService;

fn require_admin(identity: &AuthenticatedApiKey) -> Result<(), AppError> {
    if identity.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden("admin privileges required".to_string()))
    }
}

fn parse_status(value: &str) -> Result<FeedbackStatus, AppError> {
    match value {
        "pending" => Ok(FeedbackStatus::Pending),
        "approved" => Ok(FeedbackStatus::Approved),
        "rejected" => Ok(FeedbackStatus::Rejected),
        "auto-approved" | "auto_approved" => Ok(FeedbackStatus::AutoApproved),
        other => Err(AppError::BadRequest(format!("unknown feedback status: {}", other))),
    }
}

#[instrument(skip(state, body, identity))]
pub async fn submit_feedback(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SubmitFeedbackRequest>,
    identity: AuthenticatedApiKey,
) -> Result<HttpResponse, AppError> {
    let service = FeedbackService::new(state.feedback_repository.clone(), state.job_repository.clone());
    let feedback = service
        .submit(path.into_inner(), identity.api_key_id, &body.corrected_text)
        .await?;

    Ok(HttpResponse::Created().json(FeedbackView::from(feedback)))
}

#[instrument(skip(state, query, identity))]
pub async fn list_feedback(
    state: web::Data<AppState>,
    query: web::Query<FeedbackListFilter>,
    identity: AuthenticatedApiKey,
) -> Result<HttpResponse, AppError> {
    require_admin(&identity)?;

    let service = FeedbackService::new(state.feedback_repository.clone(), state.job_repository.clone());
    let feedback = service.list(&query.into_inner()).await?;
    let views: Vec<FeedbackView> = feedback.into_iter().map(FeedbackView::from).collect();

    Ok(HttpResponse::Ok().json(views))
}

#[instrument(skip(state, body, identity))]
pub async fn update_feedback_status(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<UpdateFeedbackStatusRequest>,
    identity: AuthenticatedApiKey,
) -> Result<HttpResponse, AppError> {
    require_admin(&identity)?;

    let target = parse_status(&body.status)?;
    let service = FeedbackService::new(state.feedback_repository.clone(), state.job_repository.clone());
    let feedback = service
        .update_status(path.into_inner(), target, body.confidence)
        .await?;

    Ok(HttpResponse::Ok().json(FeedbackView::from(feedback)))
}
