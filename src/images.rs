//! Image search through the Google Custom Search JSON API

use crate::config::ImageSearchConfig;
use crate::http::{build_client, ensure_success, redact_key};
use crate::{Result, TripCreatorError};
use async_trait::async_trait;
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Resolves a free-text query to at most one image URL
#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: Option<String>,
}

pub struct GoogleImageSearch {
    client: ClientWithMiddleware,
    api_key: Option<String>,
    search_engine_id: Option<String>,
    base_url: String,
    candidates: u32,
    excluded_domains: Vec<String>,
}

impl GoogleImageSearch {
    pub fn new(config: &ImageSearchConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_seconds, config.max_retries)?,
            api_key: config.api_key.clone(),
            search_engine_id: config.search_engine_id.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            candidates: config.candidates,
            excluded_domains: config
                .excluded_domains
                .iter()
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        })
    }

    /// First link whose host is not excluded
    fn pick(&self, items: Vec<SearchItem>) -> Option<String> {
        items
            .into_iter()
            .filter_map(|item| item.link)
            .find(|link| !is_excluded(link, &self.excluded_domains))
    }
}

#[async_trait]
impl ImageSearch for GoogleImageSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Option<String>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TripCreatorError::configuration_missing("Google API key"))?;
        let cx = self
            .search_engine_id
            .as_deref()
            .ok_or_else(|| TripCreatorError::configuration_missing("Google search engine id"))?;

        let url = format!(
            "{}/customsearch/v1?q={}&cx={}&searchType=image&num={}&key={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(cx),
            self.candidates,
            urlencoding::encode(api_key)
        );
        debug!("Image search request: {}", redact_key(&url));

        let response = self.client.get(&url).send().await?;
        let response = ensure_success(response, "Image search").await?;
        let body: SearchResponse = response.json().await.map_err(|e| {
            TripCreatorError::image_lookup(format!("Malformed image search response: {e}"))
        })?;

        let image = self.pick(body.items);
        debug!("Image for '{}': {:?}", query, image);
        Ok(image)
    }
}

/// Whether `link` should not be offered as an image: it is not an absolute
/// http(s) URL, or its host is an excluded domain or one of its subdomains.
fn is_excluded(link: &str, excluded: &[String]) -> bool {
    let Ok(url) = Url::parse(link) else {
        return true;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return true;
    }
    let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
        return true;
    };
    excluded
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}
