//! Configuration module
//!
//! Environment-driven configuration for the API: server, database, storage, session
//! verification, intake ceilings and the AI collaborator.

use std::env;

use crate::policy::{
    IntakePolicy, QuotaCeiling, DEFAULT_ALLOWED_CONTENT_TYPES, DEFAULT_ALLOWED_EXTENSIONS,
    DEFAULT_ANONYMOUS_MAX_FILES, DEFAULT_ANONYMOUS_MAX_FILE_SIZE_MB,
    DEFAULT_AUTHENTICATED_MAX_FILES, DEFAULT_AUTHENTICATED_MAX_FILE_SIZE_MB, MB,
};
use crate::storage_types::StorageBackend;

const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const TRUSTED_PROXY_COUNT: usize = 1;
const AI_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_AI_API_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";
pub const DEFAULT_AI_MODEL: &str = "glm-4-flash";

/// Server-level settings.
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub environment: String,
    pub trusted_proxy_count: usize,
    pub log_format: String,
}

#[derive(Clone, Debug)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub intake: IntakePolicy,
    pub ai: AiConfig,
    /// GET analysis may synthesize and persist a placeholder report.
    pub enable_mock_analysis: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AppConfig>);

impl Config {
    pub fn new(config: AppConfig) -> Self {
        Config(Box::new(config))
    }

    fn inner(&self) -> &AppConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_environment(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AppConfig::from_env()?;
        Ok(Config::new(config))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().base.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn trusted_proxy_count(&self) -> usize {
        self.inner().base.trusted_proxy_count
    }

    pub fn log_format(&self) -> &str {
        &self.inner().base.log_format
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.inner().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    /// Immutable intake policy handed to the validator and quota ledger.
    pub fn intake_policy(&self) -> IntakePolicy {
        self.inner().intake.clone()
    }

    pub fn ai(&self) -> &AiConfig {
        &self.inner().ai
    }

    pub fn enable_mock_analysis(&self) -> bool {
        self.inner().enable_mock_analysis
    }
}

fn is_production_environment(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());
        let is_production = is_production_environment(&environment);

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for session verification"))?,
            environment: environment.clone(),
            trusted_proxy_count: env::var("TRUSTED_PROXY_COUNT")
                .unwrap_or_else(|_| TRUSTED_PROXY_COUNT.to_string())
                .parse()
                .unwrap_or(TRUSTED_PROXY_COUNT),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "compact".to_string())
                .to_lowercase(),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::Local,
        };

        let intake = IntakePolicy {
            anonymous: QuotaCeiling {
                max_files: env::var("ANON_MAX_FILES")
                    .unwrap_or_else(|_| DEFAULT_ANONYMOUS_MAX_FILES.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_ANONYMOUS_MAX_FILES),
                max_file_size_bytes: env::var("ANON_MAX_FILE_SIZE_MB")
                    .unwrap_or_else(|_| DEFAULT_ANONYMOUS_MAX_FILE_SIZE_MB.to_string())
                    .parse::<u64>()
                    .unwrap_or(DEFAULT_ANONYMOUS_MAX_FILE_SIZE_MB)
                    * MB,
            },
            authenticated: QuotaCeiling {
                max_files: env::var("AUTH_MAX_FILES")
                    .unwrap_or_else(|_| DEFAULT_AUTHENTICATED_MAX_FILES.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_AUTHENTICATED_MAX_FILES),
                max_file_size_bytes: env::var("AUTH_MAX_FILE_SIZE_MB")
                    .unwrap_or_else(|_| DEFAULT_AUTHENTICATED_MAX_FILE_SIZE_MB.to_string())
                    .parse::<u64>()
                    .unwrap_or(DEFAULT_AUTHENTICATED_MAX_FILE_SIZE_MB)
                    * MB,
            },
            allowed_content_types: parse_list(
                &env::var("ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|_| DEFAULT_ALLOWED_CONTENT_TYPES.join(",")),
            ),
            allowed_extensions: parse_list(
                &env::var("ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|_| DEFAULT_ALLOWED_EXTENSIONS.join(",")),
            ),
        };

        let ai = AiConfig {
            api_key: env::var("AI_API_KEY")
                .or_else(|_| env::var("GLM_API_KEY"))
                .ok()
                .filter(|s| !s.trim().is_empty()),
            api_url: env::var("AI_API_URL").unwrap_or_else(|_| DEFAULT_AI_API_URL.to_string()),
            model: env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_AI_MODEL.to_string()),
            timeout_secs: env::var("AI_TIMEOUT_SECS")
                .unwrap_or_else(|_| AI_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(AI_TIMEOUT_SECS),
        };

        let config = AppConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: Some(
                env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./data/uploads".to_string()),
            ),
            local_storage_base_url: Some(
                env::var("LOCAL_STORAGE_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:3000/files".to_string()),
            ),
            intake,
            ai,
            enable_mock_analysis: env::var("ENABLE_MOCK_ANALYSIS")
                .unwrap_or_else(|_| (!is_production).to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(!is_production),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        for (class, ceiling) in [
            ("ANON", &self.intake.anonymous),
            ("AUTH", &self.intake.authenticated),
        ] {
            if ceiling.max_files < 0 {
                return Err(anyhow::anyhow!("{}_MAX_FILES must not be negative", class));
            }
            if ceiling.max_file_size_bytes == 0 {
                return Err(anyhow::anyhow!(
                    "{}_MAX_FILE_SIZE_MB must be greater than zero",
                    class
                ));
            }
        }

        if self.intake.allowed_content_types.is_empty() && self.intake.allowed_extensions.is_empty()
        {
            return Err(anyhow::anyhow!(
                "ALLOWED_CONTENT_TYPES and ALLOWED_EXTENSIONS cannot both be empty"
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
