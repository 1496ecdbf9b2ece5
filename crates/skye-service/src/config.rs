//! Service configuration.

use serde::Deserialize;
use std::path::Path;

use skye_core::DEFAULT_GIFT_AMOUNT;

/// Default base URL of the completion API.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Self-invited account created when the user table is empty.
#[derive(Debug, Clone)]
pub struct SeedAccount {
    /// Login email.
    pub email: String,
    /// Plain-text password, hashed at bootstrap.
    pub password: String,
    /// Display name.
    pub name: String,
    /// Invitation code handed to the first invitees.
    pub invitation_code: Option<String>,
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,

    /// HS256 secret for session tokens.
    pub jwt_secret: String,

    /// Session token lifetime in seconds (default: 7 days).
    pub session_ttl_seconds: u64,

    /// Admin API key. Admin routes reject every request when unset.
    pub admin_api_key: Option<String>,

    /// Completion API key (optional; canned completions without it).
    pub openai_api_key: Option<String>,

    /// Completion API base URL.
    pub openai_base_url: String,

    /// Timeout for one completion call in seconds.
    pub completion_timeout_seconds: u64,

    /// bcrypt cost factor for new password hashes.
    pub password_hash_cost: u32,

    /// Registration bonus granted to the newcomer and to the inviter.
    pub gift_amount: i64,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Seed account for an empty database.
    pub seed: Option<SeedAccount>,
}

/// `OpenAI` secrets file structure.
#[derive(Debug, Deserialize)]
struct OpenAiSecrets {
    api_key: String,
    #[serde(default)]
    base_url: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let (openai_api_key, openai_base_url) = load_openai_secrets();

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set - sessions will not survive a restart");
            uuid::Uuid::new_v4().simple().to_string()
        });

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            database_url: std::env::var("DATABASE_URL").ok(),
            jwt_secret,
            session_ttl_seconds: env_parse("SESSION_TTL_SECONDS", 7 * 24 * 3600),
            admin_api_key: std::env::var("ADMIN_API_KEY").ok(),
            openai_api_key,
            openai_base_url: openai_base_url.unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into()),
            completion_timeout_seconds: env_parse("COMPLETION_TIMEOUT_SECONDS", 60),
            password_hash_cost: env_parse("BCRYPT_COST", bcrypt::DEFAULT_COST),
            gift_amount: env_parse("GIFT_AMOUNT", DEFAULT_GIFT_AMOUNT),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_parse("MAX_BODY_BYTES", 1024 * 1024), // 1MB
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS", 90),
            seed: load_seed_account(),
        }
    }
}

/// Parse an environment variable, falling back to `default` when unset or invalid.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn load_seed_account() -> Option<SeedAccount> {
    let email = std::env::var("SEED_EMAIL").ok()?;
    let password = std::env::var("SEED_PASSWORD").ok()?;
    Some(SeedAccount {
        email,
        password,
        name: std::env::var("SEED_NAME").unwrap_or_else(|_| "root".into()),
        invitation_code: std::env::var("SEED_INVITATION_CODE").ok(),
    })
}

/// Load `OpenAI` secrets from file or environment.
fn load_openai_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [".secrets/openai.json", "../.secrets/openai.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<OpenAiSecrets>(path) {
            tracing::info!(path = %path, "Loaded OpenAI secrets from file");
            let base_url = secrets
                .base_url
                .or_else(|| std::env::var("OPENAI_BASE_URL").ok());
            return (Some(secrets.api_key), base_url);
        }
    }

    tracing::debug!("OpenAI secrets file not found, using environment variables");
    (
        std::env::var("OPENAI_API_KEY").ok(),
        std::env::var("OPENAI_BASE_URL").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            database_url: None,
            jwt_secret: "development-secret".into(),
            session_ttl_seconds: 7 * 24 * 3600,
            admin_api_key: None,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.into(),
            completion_timeout_seconds: 60,
            password_hash_cost: bcrypt::DEFAULT_COST,
            gift_amount: DEFAULT_GIFT_AMOUNT,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 90,
            seed: None,
        }
    }
}
