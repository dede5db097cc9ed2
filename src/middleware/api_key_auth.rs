use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::{
    Error, FromRequest, HttpMessage,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
};
use futures_util::future::{Ready, ok};
use tracing::{debug, warn};

use crate::db::repositories::api_key_repository::ApiKeyRepository;
use crate::models::api_key::AuthenticatedApiKey;
use crate::security::api_key_hashing::hash_api_key;

const API_KEY_HEADER: &str = "x-api-key";

fn extract_raw_key(req: &ServiceRequest) -> Option<String> {
    if let Some(value) = req.headers().get(API_KEY_HEADER) {
        return value.to_str().ok().map(|s| s.trim().to_string());
    }

    let auth = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    auth.strip_prefix("ApiKey ")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Authenticates every request behind the protected scope against the `api_keys` table
/// (spec.md §4.2). Unlike the teacher's JWT middleware, the repository handle is passed in
/// directly at construction time rather than reached for through a global static.
#[derive(Clone)]
pub struct ApiKeyAuth {
    repository: Arc<ApiKeyRepository>,
}

impl ApiKeyAuth {
    pub fn new(repository: Arc<ApiKeyRepository>) -> Self {
        Self { repository }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = ApiKeyAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ApiKeyAuthMiddleware {
            service: Arc::new(service),
            repository: self.repository.clone(),
        })
    }
}

pub struct ApiKeyAuthMiddleware<S> {
    service: Arc<S>,
    repository: Arc<ApiKeyRepository>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let repository = self.repository.clone();
        let path = req.path().to_string();

        if req.method() == actix_web::http::Method::OPTIONS {
            return Box::pin(service.call(req));
        }

        let raw_key = match extract_raw_key(&req) {
            Some(key) => key,
            None => {
                warn!("missing API key for path: {}", path);
                return Box::pin(async move {
                    Err(Error::from(actix_web::error::ErrorUnauthorized(
                        "Missing API key",
                    )))
                });
            }
        };

        Box::pin(async move {
            let key_hash = hash_api_key(&raw_key)
                .map_err(|_| actix_web::error::ErrorInternalServerError("authentication failure"))?;

            let api_key = repository
                .find_active_by_hash(&key_hash)
                .await
                .map_err(|_| actix_web::error::ErrorInternalServerError("authentication failure"))?
                .ok_or_else(|| actix_web::error::ErrorUnauthorized("Invalid or revoked API key"))?;

            debug!("authenticated api key {} for path {}", api_key.id, path);

            req.extensions_mut().insert(AuthenticatedApiKey {
                api_key_id: api_key.id,
                is_admin: api_key.is_admin,
                rate_limit: api_key.rate_limit,
            });

            service.call(req).await
        })
    }
}

impl FromRequest for AuthenticatedApiKey {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedApiKey>().cloned() {
            Some(identity) => ok(identity),
            None => futures_util::future::err(actix_web::error::ErrorUnauthorized(
                "Request is not authenticated",
            )),
        }
    }
}
