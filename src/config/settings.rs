use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppSettings {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub queue: QueueConfig,
    pub recognizer: RecognizerConfig,
    pub polish: PolishConfig,
    pub pipeline: PipelineConfig,
    pub lexicon_cache: LexiconCacheConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub environment: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory audio blobs are written under; all access is rejected outside of it.
    pub root: String,
    pub max_audio_bytes: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueueConfig {
    pub worker_count: usize,
    pub visibility_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub job_timeout_secs: u64,
    /// Orphan-sweep: PENDING rows idle longer than this are re-enqueued.
    pub orphan_pending_threshold_secs: u64,
    /// Orphan-sweep: PROCESSING rows running longer than job_timeout * this factor are failed as STUCK.
    pub stuck_timeout_multiplier: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecognizerConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub retry_max: u32,
    pub retry_initial_ms: u64,
    pub retry_multiplier: f64,
    pub retry_cap_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolishConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub model: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub enable_lexicon: bool,
    pub enable_cleanup: bool,
    pub enable_numeral: bool,
    pub enable_large_model_polish: bool,
    /// One of "force-ascii", "force-local", "preserve", "context-aware".
    pub numeral_strategy: String,
    pub fuzzy_enabled: bool,
    pub fuzzy_threshold: u8,
    pub language_normalisations_enabled: bool,
    pub confidence_alpha: f64,
    pub confidence_beta: f64,
    pub confidence_gamma: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LexiconCacheConfig {
    pub ttl_secs: u64,
}

impl AppSettings {
    pub fn from_env() -> Result<Self, AppError> {
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "transcribe-server".to_string());
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Configuration("DATABASE_URL must be set".to_string()))?;
        let db_max_connections = env::var("DB_POOL_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);
        let db_min_connections = env::var("DB_POOL_MIN")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);
        let db_acquire_timeout_ms = env::var("DB_POOL_ACQUIRE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| AppError::Configuration("SERVER_PORT must be a valid port number".to_string()))?;
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let storage_root = env::var("STORAGE_ROOT").unwrap_or_else(|_| "./data/audio".to_string());
        let max_audio_bytes = env::var("MAX_AUDIO_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10 * 1024 * 1024);

        let worker_count = env::var("QUEUE_WORKER_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);
        let visibility_timeout_secs = env::var("QUEUE_VISIBILITY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);
        let poll_interval_secs = env::var("QUEUE_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);
        let job_timeout_secs = env::var("QUEUE_JOB_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);
        let orphan_pending_threshold_secs = env::var("QUEUE_ORPHAN_PENDING_THRESHOLD_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);
        let stuck_timeout_multiplier = env::var("QUEUE_STUCK_TIMEOUT_MULTIPLIER")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let sweep_interval_secs = env::var("QUEUE_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let recognizer_base_url = env::var("RECOGNIZER_BASE_URL")
            .map_err(|_| AppError::Configuration("RECOGNIZER_BASE_URL must be set".to_string()))?;
        let recognizer_api_key = env::var("RECOGNIZER_API_KEY")
            .map_err(|_| AppError::Configuration("RECOGNIZER_API_KEY must be set".to_string()))?;
        let recognizer_timeout_secs = env::var("RECOGNIZER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        let recognizer_retry_max = env::var("RECOGNIZER_RETRY_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let recognizer_retry_initial_ms = env::var("RECOGNIZER_RETRY_INITIAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);
        let recognizer_retry_multiplier = env::var("RECOGNIZER_RETRY_MULTIPLIER")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2.0);
        let recognizer_retry_cap_ms = env::var("RECOGNIZER_RETRY_CAP_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60_000);

        let polish_enabled = env::var("POLISH_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);
        let polish_base_url = env::var("POLISH_BASE_URL").unwrap_or_default();
        let polish_api_key = env::var("POLISH_API_KEY").unwrap_or_default();
        let polish_timeout_secs = env::var("POLISH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        let polish_model = env::var("POLISH_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let enable_lexicon = env::var("PIPELINE_ENABLE_LEXICON")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);
        let enable_cleanup = env::var("PIPELINE_ENABLE_CLEANUP")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);
        let enable_numeral = env::var("PIPELINE_ENABLE_NUMERAL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);
        let enable_large_model_polish = env::var("PIPELINE_ENABLE_POLISH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);
        let numeral_strategy = env::var("PIPELINE_NUMERAL_STRATEGY")
            .unwrap_or_else(|_| "context-aware".to_string());
        let fuzzy_enabled = env::var("PIPELINE_FUZZY_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);
        let fuzzy_threshold = env::var("PIPELINE_FUZZY_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(85);
        let language_normalisations_enabled = env::var("PIPELINE_LANGUAGE_NORMALISATIONS_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);
        let confidence_alpha = env::var("PIPELINE_CONFIDENCE_ALPHA")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.02);
        let confidence_beta = env::var("PIPELINE_CONFIDENCE_BETA")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.05);
        let confidence_gamma = env::var("PIPELINE_CONFIDENCE_GAMMA")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.5);

        let lexicon_cache_ttl_secs = env::var("LEXICON_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        Ok(Self {
            app: AppConfig {
                name: app_name,
                environment,
            },
            server: ServerConfig {
                host: server_host,
                port: server_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: db_max_connections,
                min_connections: db_min_connections,
                acquire_timeout_ms: db_acquire_timeout_ms,
            },
            storage: StorageConfig {
                root: storage_root,
                max_audio_bytes,
            },
            queue: QueueConfig {
                worker_count,
                visibility_timeout_secs,
                poll_interval_secs,
                job_timeout_secs,
                orphan_pending_threshold_secs,
                stuck_timeout_multiplier,
                sweep_interval_secs,
            },
            recognizer: RecognizerConfig {
                base_url: recognizer_base_url,
                api_key: recognizer_api_key,
                timeout_secs: recognizer_timeout_secs,
                retry_max: recognizer_retry_max,
                retry_initial_ms: recognizer_retry_initial_ms,
                retry_multiplier: recognizer_retry_multiplier,
                retry_cap_ms: recognizer_retry_cap_ms,
            },
            polish: PolishConfig {
                enabled: polish_enabled,
                base_url: polish_base_url,
                api_key: polish_api_key,
                timeout_secs: polish_timeout_secs,
                model: polish_model,
            },
            pipeline: PipelineConfig {
                enable_lexicon,
                enable_cleanup,
                enable_numeral,
                enable_large_model_polish,
                numeral_strategy,
                fuzzy_enabled,
                fuzzy_threshold,
                language_normalisations_enabled,
                confidence_alpha,
                confidence_beta,
                confidence_gamma,
            },
            lexicon_cache: LexiconCacheConfig {
                ttl_secs: lexicon_cache_ttl_secs,
            },
        })
    }
}
