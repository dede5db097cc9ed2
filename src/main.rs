use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use dotenv::dotenv;

use transcribe_server::clients::{LargeModelPolishClient, RecognizerClient};
use transcribe_server::config::AppSettings;
use transcribe_server::db::connection::{create_pool, verify_connection};
use transcribe_server::db::repositories::{ApiKeyRepository, FeedbackRepository, JobRepository, LexiconRepository};
use transcribe_server::handlers::health::health_check;
use transcribe_server::lexicon::cache::LexiconCache;
use transcribe_server::middleware::ApiKeyAuth;
use transcribe_server::models::app_state::AppState;
use transcribe_server::queue::JobQueue;
use transcribe_server::routes::configure_routes;
use transcribe_server::security::key_management::init_global_key_config;
use transcribe_server::services::sweep;
use transcribe_server::services::worker::Worker;
use transcribe_server::storage::ObjectStore;
use transcribe_server::utils::http_client::new_api_client;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_settings = match AppSettings::from_env() {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            log::error!("Failed to load application settings from environment: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_global_key_config() {
        log::error!("Failed to initialize key config: {}", e);
        std::process::exit(1);
    }
    log::info!("key config initialized successfully");

    let db_pool = match create_pool(&app_settings.database).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to create database connection pool: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = verify_connection(&db_pool).await {
        log::error!("Database connection verification failed: {}", e);
        std::process::exit(1);
    }
    log::info!("database connection established successfully");

    let api_key_repository = Arc::new(ApiKeyRepository::new(db_pool.clone()));
    let job_repository = Arc::new(JobRepository::new(db_pool.clone()));
    let lexicon_repository = Arc::new(LexiconRepository::new(db_pool.clone()));
    let feedback_repository = Arc::new(FeedbackRepository::new(db_pool.clone()));

    let lexicon_cache = Arc::new(LexiconCache::new(app_settings.lexicon_cache.ttl_secs));
    let queue = Arc::new(JobQueue::new(
        job_repository.clone(),
        app_settings.queue.visibility_timeout_secs,
        app_settings.queue.poll_interval_secs,
    ));

    let storage = Arc::new(ObjectStore::new(app_settings.storage.root.clone()));
    if let Err(e) = storage.ensure_root().await {
        log::error!("Failed to prepare audio storage root: {}", e);
        std::process::exit(1);
    }

    let http_client = new_api_client();
    let transcription_client = Arc::new(RecognizerClient::new(http_client.clone(), app_settings.recognizer.clone()));
    let polish_client = Arc::new(LargeModelPolishClient::new(http_client.clone(), app_settings.polish.clone()));

    for worker_id in 0..app_settings.queue.worker_count.max(1) {
        let worker = Arc::new(Worker::new(
            queue.clone(),
            job_repository.clone(),
            lexicon_repository.clone(),
            lexicon_cache.clone(),
            storage.clone(),
            transcription_client.clone(),
            polish_client.clone(),
            app_settings.pipeline.clone(),
            app_settings.polish.clone(),
            app_settings.queue.clone(),
        ));
        log::info!("spawning transcription worker {}", worker_id);
        tokio::spawn(worker.run_forever());
    }

    let sweep_scheduler = match sweep::start(job_repository.clone(), queue.clone(), app_settings.queue.clone()).await {
        Ok(scheduler) => scheduler,
        Err(e) => {
            log::error!("Failed to start orphan sweep scheduler: {}", e);
            std::process::exit(1);
        }
    };
    // Owned for the life of the process; dropping it would stop the cron ticks.
    std::mem::forget(sweep_scheduler);

    let app_state = AppState {
        settings: app_settings.clone(),
        api_key_repository: api_key_repository.clone(),
        job_repository,
        lexicon_repository,
        feedback_repository,
        queue,
        lexicon_cache,
        storage,
    };

    let host = app_settings.server.host.clone();
    let port = app_settings.server.port;
    log::info!("starting server at http://{}:{}", host, port);

    HttpServer::new(move || {
        let mut cors = Cors::default().supports_credentials();
        if app_settings.server.cors_origins.iter().any(|o| o == "*") {
            cors = cors.allow_any_origin();
        } else {
            for origin in &app_settings.server.cors_origins {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(Logger::default())
            .wrap(cors)
            .service(web::resource("/health").route(web::get().to(health_check)))
            .service(
                web::scope("/api")
                    .wrap(ApiKeyAuth::new(api_key_repository.clone()))
                    .configure(configure_routes),
            )
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
