use super::query::{build_search_url, SearchOptions};
use super::response::{normalize, SearchResult};
use crate::config::Config;
use crate::error::{ConfigError, SearchError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    config: Config,
}

impl SearchClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ConfigError::Invalid(format!("user agent: {e}")))?,
        );

        let client = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { client, config: config.clone() })
    }

    pub async fn search(&self, options: &SearchOptions) -> Result<SearchResult, SearchError> {
        let url = build_search_url(&self.config, options)?;
        debug!(
            "Searching images: query={:?} num={} safe={:?} start={:?}",
            options.query,
            options.normalized_count(),
            options.safe,
            options.start_index
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SearchError::new(format!("Image search API request failed: {}", e.without_url())))?;

        let status = resp.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown status");
            return Err(SearchError::http(status.as_u16(), reason));
        }

        let body: serde_json::Value = resp.json().await.map_err(|e| {
            SearchError::new(format!("Invalid response format from image search API: {}", e.without_url()))
        })?;

        normalize(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::response::fixtures::body;
    use crate::test_support::{serve_once, MockResponse};

    #[tokio::test]
    async fn returns_normalized_result() {
        let (base, request) = serve_once(MockResponse::json(200, &body(2, None, Some(3)))).await;
        let client = SearchClient::new(&Config::for_tests(&format!("{base}/customsearch/v1"))).unwrap();

        let mut options = SearchOptions::new("cat");
        options.count = Some(2);
        let result = client.search(&options).await.unwrap();

        assert_eq!(result.items.len(), 2);
        assert_eq!(result.next_page_idx, Some(3));

        let head = request.await.unwrap();
        assert!(head.starts_with("GET /customsearch/v1?"));
        assert!(head.contains("num=2"));
        assert!(head.contains("searchType=image"));
        assert!(!head.contains("start="));
    }

    #[tokio::test]
    async fn http_error_carries_status() {
        let (base, _request) = serve_once(MockResponse::text(403, "text/plain", "quota")).await;
        let client = SearchClient::new(&Config::for_tests(&base)).unwrap();

        let err = client.search(&SearchOptions::new("cat")).await.unwrap_err();
        assert_eq!(err.status, Some(403));
        assert_eq!(err.status_text.as_deref(), Some("Forbidden"));
    }

    #[tokio::test]
    async fn non_json_body_is_a_format_error() {
        let (base, _request) = serve_once(MockResponse::text(200, "text/html", "<html></html>")).await;
        let client = SearchClient::new(&Config::for_tests(&base)).unwrap();

        let err = client.search(&SearchOptions::new("cat")).await.unwrap_err();
        assert!(err.message.starts_with("Invalid response format"));
        assert_eq!(err.status, None);
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails() {
        let client = SearchClient::new(&Config::for_tests("http://127.0.0.1:1")).unwrap();
        let err = client.search(&SearchOptions::new("cat")).await.unwrap_err();
        assert!(err.message.starts_with("Image search API request failed"));
    }
}
