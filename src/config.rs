use crate::error::{Error, Result};
use crate::services::normalizer::NormalizeMode;
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub use_mock: bool,
    pub normalize_mode: NormalizeMode,
    pub upstream_timeout_secs: u64,
    pub generation_timeout_secs: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: "0.0.0.0:4000".to_string(),
            openai_api_key: None,
            openai_model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            use_mock: false,
            normalize_mode: NormalizeMode::Strict,
            upstream_timeout_secs: 120,
            generation_timeout_secs: 300,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let port: u16 = get_env_parse_or("PORT", 4000)?;
        let server_address =
            env::var("SERVER_ADDRESS").unwrap_or_else(|_| format!("0.0.0.0:{}", port));

        let openai_api_key = env::var("BACKEND_OPENAI_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        if openai_api_key.is_none() {
            tracing::warn!(
                "BACKEND_OPENAI_KEY is not set. AI endpoints will return 500 until it is configured."
            );
        }

        Ok(Self {
            server_address,
            openai_api_key,
            openai_model: env::var("BACKEND_OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            use_mock: get_env_parse_or("USE_MOCK_AI", false)?,
            normalize_mode: get_env_parse_or("NORMALIZE_MODE", NormalizeMode::Strict)?,
            upstream_timeout_secs: get_env_parse_or("UPSTREAM_TIMEOUT_SECS", 120)?,
            generation_timeout_secs: get_env_parse_or("GENERATION_TIMEOUT_SECS", 300)?,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(default),
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
