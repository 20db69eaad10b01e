pub mod cache;

pub use cache::{NewsCache, NewsService, DEFAULT_CACHE_CAPACITY};

use agri_core::{AgriError, AgriResult, NewsItem, NewsSearchProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://serpapi.com/search.json";

/// The one query every `/news` call runs. Never derived from caller input.
pub const NEWS_QUERY: &str = "pangan agrikultur hortikultur";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news_results: Option<Vec<NewsItem>>,
    #[serde(default)]
    error: Option<String>,
}

/// Google News search through SerpAPI, restricted to Indonesian results.
#[derive(Clone)]
pub struct SerpApiClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl SerpApiClient {
    pub fn new(api_key: String) -> AgriResult<Self> {
        Self::with_base_url(api_key, BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> AgriResult<Self> {
        let client = Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .map_err(|e| AgriError::UpstreamUnavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url,
            client,
        })
    }

    fn query_params(&self) -> [(&'static str, &str); 8] {
        [
            ("api_key", self.api_key.as_str()),
            ("engine", "google"),
            ("google_domain", "google.co.id"),
            ("q", NEWS_QUERY),
            ("tbm", "nws"),
            ("hl", "id"),
            ("gl", "id"),
            ("location", "Indonesia"),
        ]
    }
}

#[async_trait]
impl NewsSearchProvider for SerpApiClient {
    async fn search_news(&self) -> AgriResult<Vec<NewsItem>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query_params())
            .send()
            .await
            .map_err(|e| AgriError::UpstreamUnavailable(format!("SerpAPI request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AgriError::UpstreamUnavailable(format!(
                "SerpAPI HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AgriError::UpstreamUnavailable(e.to_string()))?;

        parse_news_results(&body)
    }
}

/// Extracts `news_results` from a SerpAPI body. A body without the array is
/// treated as an upstream failure.
pub fn parse_news_results(body: &str) -> AgriResult<Vec<NewsItem>> {
    let parsed: SearchResponse = serde_json::from_str(body)
        .map_err(|e| AgriError::UpstreamUnavailable(format!("malformed SerpAPI payload: {}", e)))?;

    match (parsed.news_results, parsed.error) {
        (Some(results), _) => Ok(results),
        (None, Some(error)) => {
            tracing::warn!("SerpAPI returned an error: {}", error);
            Err(AgriError::UpstreamUnavailable(error))
        }
        (None, None) => Err(AgriError::UpstreamUnavailable(
            "SerpAPI payload has no news_results".to_string(),
        )),
    }
}
