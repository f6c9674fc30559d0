use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    /// `None` runs the service in demo mode on the in-memory repository.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub storage_dir: String,
    pub storage_signing_secret: String,
    pub public_base_url: String,
    pub signed_url_ttl_secs: u64,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub api_rps: u32,
    pub poll_interval_secs: u64,
    pub log_format: String,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env_opt("DATABASE_URL"),
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_ttl_hours: get_env_parse_or("JWT_TTL_HOURS", 168)?,
            storage_dir: get_env_opt("STORAGE_DIR").unwrap_or_else(|| "./storage".to_string()),
            storage_signing_secret: get_env("STORAGE_SIGNING_SECRET")?,
            public_base_url: get_env_opt("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            signed_url_ttl_secs: get_env_parse_or("SIGNED_URL_TTL_SECS", 60)?,
            gemini_api_key: get_env_opt("GEMINI_API_KEY"),
            gemini_model: get_env_opt("GEMINI_MODEL")
                .unwrap_or_else(|| "gemini-3-flash-preview".to_string()),
            api_rps: get_env_parse_or("API_RPS", 50)?,
            poll_interval_secs: get_env_parse_or("POLL_INTERVAL_SECS", 10)?,
            log_format: get_env_opt("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
        })
    }

    pub fn is_demo_mode(&self) -> bool {
        self.database_url.is_none()
    }

    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
