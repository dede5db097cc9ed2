use actix_web::web;

use crate::handlers;

/// Configures the protected API surface (spec.md §6), mounted under a scope wrapped by
/// `ApiKeyAuth` in main.rs. `/health` is the only route registered outside this scope.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/jobs")
            .route(web::post().to(handlers::jobs::submit_job)),
    );
    cfg.service(
        web::resource("/jobs/{job_id}")
            .route(web::get().to(handlers::jobs::get_job)),
    );
    cfg.service(
        web::resource("/jobs/{job_id}/feedback")
            .route(web::post().to(handlers::feedback::submit_feedback)),
    );

    cfg.service(
        web::resource("/lexicons")
            .route(web::get().to(handlers::lexicons::list_lexicons)),
    );
    cfg.service(
        web::resource("/lexicons/{lexicon_id}")
            .route(web::get().to(handlers::lexicons::get_lexicon)),
    );
    cfg.service(
        web::resource("/lexicons/{lexicon_id}/terms")
            .route(web::post().to(handlers::lexicons::create_term)),
    );
    cfg.service(
        web::resource("/lexicons/{lexicon_id}/terms/{term_id}")
            .route(web::put().to(handlers::lexicons::update_term))
            .route(web::delete().to(handlers::lexicons::delete_term)),
    );

    cfg.service(
        web::resource("/feedback")
            .route(web::get().to(handlers::feedback::list_feedback)),
    );
    cfg.service(
        web::resource("/feedback/{feedback_id}")
            .route(web::patch().to(handlers::feedback::update_feedback_status)),
    );
}
