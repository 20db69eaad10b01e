use anyhow::{bail, Context, Result};
use serpapi_client::DEFAULT_CACHE_CAPACITY;
use std::fmt;

/// Process-wide settings, read once at startup and never mutated.
#[derive(Clone)]
pub struct Settings {
    pub auth_api_key: String,
    pub mongodb_url: String,
    pub mongodb_database: String,
    pub serpapi_api_key: String,
    pub vllm_api_key: String,
    pub vllm_api_base: String,
    pub vllm_model_name: String,
    pub bind_addr: String,
    pub news_cache_capacity: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from `lookup`. Every variable is tried upper-case
    /// first, then lower-case.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .or_else(|| lookup(&name.to_lowercase()))
                .filter(|v| !v.trim().is_empty())
        };
        let required = |name: &str| get(name).with_context(|| format!("{} must be set", name));

        let news_cache_capacity = match get("NEWS_CACHE_CAPACITY") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("NEWS_CACHE_CAPACITY is not a number: {}", raw))?,
            None => DEFAULT_CACHE_CAPACITY,
        };
        if news_cache_capacity == 0 {
            bail!("NEWS_CACHE_CAPACITY must be >= 1");
        }

        Ok(Self {
            auth_api_key: required("AUTH_API_KEY")?,
            mongodb_url: required("MONGODB_URL")?,
            mongodb_database: get("MONGODB_DATABASE").unwrap_or_else(|| "prod".to_string()),
            serpapi_api_key: required("SERPAPI_API_KEY")?,
            vllm_api_key: required("VLLM_API_KEY")?,
            vllm_api_base: required("VLLM_API_BASE")?,
            vllm_model_name: required("VLLM_MODEL_NAME")?,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            news_cache_capacity,
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("auth_api_key", &"<redacted>")
            .field("mongodb_url", &"<redacted>")
            .field("mongodb_database", &self.mongodb_database)
            .field("serpapi_api_key", &"<redacted>")
            .field("vllm_api_key", &"<redacted>")
            .field("vllm_api_base", &self.vllm_api_base)
            .field("vllm_model_name", &self.vllm_model_name)
            .field("bind_addr", &self.bind_addr)
            .field("news_cache_capacity", &self.news_cache_capacity)
            .finish()
    }
}
