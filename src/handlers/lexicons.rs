use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::lexicon::validator::LexiconValidator;
use crate::lexicon::normalize_term;
use crate::models::api_key::AuthenticatedApiKey;
use crate::models::app_state::AppState;
use crate::models::lexicon::{LexiconTerm, NewLexiconTerm, UpdateLexiconTerm};

#[derive(Serialize)]
struct LexiconIdsResponse {
    lexicons: Vec<String>,
}

#[instrument(skip(state, _identity))]
pub async fn list_lexicons(
    state: web::Data<AppState>,
    _identity: AuthenticatedApiKey,
) -> Result<HttpResponse, AppError> {
    let ids = state.lexicon_repository.list_lexicon_ids().await?;
    Ok(HttpResponse::Ok().json(LexiconIdsResponse { lexicons: ids }))
}

#[instrument(skip(state, _identity))]
pub async fn get_lexicon(
    state: web::Data<AppState>,
    path: web::Path<String>,
    _identity: AuthenticatedApiKey,
) -> Result<HttpResponse, AppError> {
    let lexicon_id = path.into_inner();
    let terms = state.lexicon_repository.list_active(&lexicon_id).await?;
    Ok(HttpResponse::Ok().json(terms))
}

#[instrument(skip(state, body, _identity))]
pub async fn create_term(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<NewLexiconTerm>,
    _identity: AuthenticatedApiKey,
) -> Result<HttpResponse, AppError> {
    let lexicon_id = path.into_inner();
    let validator = LexiconValidator::new(&state.lexicon_repository);
    validator
        .validate(&lexicon_id, &body.term, &body.replacement, None)
        .await?;

    let normalized = normalize_term(&body.term);
    let term: LexiconTerm = state
        .lexicon_repository
        .insert(&lexicon_id, &body.term, &normalized, &body.replacement)
        .await?;

    state.lexicon_cache.invalidate(&lexicon_id);

    Ok(HttpResponse::Created().json(term))
}

#[instrument(skip(state, body, _identity))]
pub async fn update_term(
    state: web::Data<AppState>,
    path: web::Path<(String, i32)>,
    body: web::Json<UpdateLexiconTerm>,
    _identity: AuthenticatedApiKey,
) -> Result<HttpResponse, AppError> {
    let (lexicon_id, term_id) = path.into_inner();

    let existing = state
        .lexicon_repository
        .find_by_id(term_id)
        .await?
        .filter(|t| t.lexicon_id == lexicon_id && t.active)
        .ok_or_else(|| AppError::NotFound(format!("Lexicon term not found: {}", term_id)))?;

    let term_value = body.term.clone().unwrap_or(existing.term);
    let replacement_value = body.replacement.clone().unwrap_or(existing.replacement);

    let validator = LexiconValidator::new(&state.lexicon_repository);
    validator
        .validate(&lexicon_id, &term_value, &replacement_value, Some(term_id))
        .await?;

    let normalized = normalize_term(&term_value);
    let updated = state
        .lexicon_repository
        .update(term_id, &term_value, &normalized, &replacement_value)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lexicon term not found: {}", term_id)))?;

    state.lexicon_cache.invalidate(&lexicon_id);

    Ok(HttpResponse::Ok().json(updated))
}

#[instrument(skip(state, _identity))]
pub async fn delete_term(
    state: web::Data<AppState>,
    path: web::Path<(String, i32)>,
    _identity: AuthenticatedApiKey,
) -> Result<HttpResponse, AppError> {
    let (lexicon_id, term_id) = path.into_inner();

    let deleted = state.lexicon_repository.soft_delete(term_id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Lexicon term not found: {}", term_id)));
    }

    state.lexicon_cache.invalidate(&lexicon_id);

    Ok(HttpResponse::NoContent().finish())
}
