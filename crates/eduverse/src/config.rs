use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub database_path: PathBuf,
    pub database_pool_size: u32,
    pub llm_api_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub session_ttl_hours: i64,
    pub request_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            warn!("Failed to load .env file: {}. Using system environment variables.", e);
        } else {
            info!("Loaded environment variables from .env file");
        }

        // Provider credentials are optional here: chat fails on first use instead.
        let llm_api_key = env::var("LLM_API_KEY").ok().filter(|k| !k.trim().is_empty());
        if llm_api_key.is_none() {
            warn!("LLM_API_KEY not set; the chat assistant will be unavailable");
        }

        Ok(Self {
            api_host: env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            api_port: parse_var("API_PORT", 8000)?,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/eduverse.db".into())
                .into(),
            database_pool_size: parse_var("DATABASE_POOL_SIZE", 10)?,
            llm_api_url: env::var("LLM_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com".into())
                .trim_end_matches('/')
                .to_string(),
            llm_api_key,
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            llm_max_tokens: parse_var("LLM_MAX_TOKENS", 1024)?,
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", 168)?,
            request_timeout_seconds: parse_var("REQUEST_TIMEOUT_SECONDS", 120)?,
        })
    }

    pub fn print_config(&self) {
        info!("Current Configuration:");
        info!("- API: {}:{}", self.api_host, self.api_port);
        info!("- Database: {} (pool {})", self.database_path.display(), self.database_pool_size);
        info!("- LLM API: {}", self.llm_api_url);
        info!("- LLM Model: {} (max tokens {})", self.llm_model, self.llm_max_tokens);
        info!("- LLM Key: {}", if self.llm_api_key.is_some() { "set" } else { "missing" });
        info!("- Session TTL: {}h", self.session_ttl_hours);
        info!("- Request Timeout: {}s", self.request_timeout_seconds);
    }

    pub fn api_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.api_host, self.api_port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.api_host, self.api_port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: "127.0.0.1".to_string(),
            api_port: 8000,
            database_path: PathBuf::from("./data/eduverse.db"),
            database_pool_size: 10,
            llm_api_url: "https://api.openai.com".to_string(),
            llm_api_key: None,
            llm_model: "gpt-4o-mini".to_string(),
            llm_max_tokens: 1024,
            session_ttl_hours: 168,
            request_timeout_seconds: 120,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}
