use std::env;
use std::path::PathBuf;

use tokio::time::Duration;

use crate::error::ConfigError;
use crate::retry::RetryPolicy;

pub const DEFAULT_TOGETHER_BASE_URL: &str = "https://api.together.xyz";
pub const DEFAULT_GENERATION_MODEL: &str = "black-forest-labs/FLUX.1-schnell-Free";
pub const DEFAULT_IMGBB_UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";
const DEFAULT_PORT: u16 = 7860;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POOL_SIZE: u32 = 5;

#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Clone, Debug)]
pub struct HostingConfig {
    pub api_key: String,
    pub upload_url: String,
    pub timeout: Duration,
    /// Seconds after which ImgBB deletes the upload.
    pub expiration: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub connect_retry: RetryPolicy,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub hosting: HostingConfig,
    pub database: DatabaseConfig,
    pub call_retry: RetryPolicy,
    pub port: u16,
    pub secret_key: Option<String>,
    pub debug: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let generation = GenerationConfig {
            api_key: get("TOGETHER_API_KEY").ok_or(ConfigError::Missing("TOGETHER_API_KEY"))?,
            base_url: get("TOGETHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TOGETHER_BASE_URL.to_string()),
            model: get("GENERATION_MODEL").unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string()),
        };

        let timeout_secs = parse_number(get("IMGBB_TIMEOUT_SECS"), "IMGBB_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS);
        let hosting = HostingConfig {
            api_key: get("IMGBB_API_KEY").ok_or(ConfigError::Missing("IMGBB_API_KEY"))?,
            upload_url: get("IMGBB_UPLOAD_URL")
                .unwrap_or_else(|| DEFAULT_IMGBB_UPLOAD_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            expiration: parse_number(get("IMGBB_EXPIRATION"), "IMGBB_EXPIRATION")?,
        };

        let pool_size: u32 = parse_number(get("DB_POOL_SIZE"), "DB_POOL_SIZE")?
            .unwrap_or(DEFAULT_POOL_SIZE);
        if pool_size == 0 {
            return Err(ConfigError::invalid("DB_POOL_SIZE", "must be at least 1"));
        }
        let database = DatabaseConfig {
            url: get("DATABASE_URL")
                .or_else(|| get("MYSQL_URL"))
                .unwrap_or_else(default_database_url),
            pool_size,
            connect_retry: RetryPolicy::fixed(3, Duration::from_secs(1)),
        };

        Ok(Self {
            generation,
            hosting,
            database,
            call_retry: RetryPolicy::exponential(3, Duration::from_secs(1)),
            port: parse_number(get("MCP_PORT"), "MCP_PORT")?.unwrap_or(DEFAULT_PORT),
            secret_key: get("SECRET_KEY"),
            debug: get("DEBUG").is_some_and(|value| is_truthy(&value)),
        })
    }

    /// `/{SECRET_KEY}` when a secret key is set, otherwise empty.
    pub fn route_prefix(&self) -> String {
        self.secret_key
            .as_deref()
            .map(|value| format!("/{value}"))
            .unwrap_or_default()
    }

    pub fn scoped_path(&self, name: &str) -> String {
        format!("{}/{}", self.route_prefix(), name)
    }

    pub fn mcp_path(&self) -> String {
        self.scoped_path("mcp")
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_number<T: std::str::FromStr>(
    raw: Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value
            .parse::<T>()
            .map_err(|err| ConfigError::invalid(key, format!("{value:?}: {err}")))
    })
    .transpose()
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn default_database_url() -> String {
    let mut base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push("image-gen-rmcp");
    base.push("images.db");
    format!("sqlite://{}?mode=rwc", base.display())
}
