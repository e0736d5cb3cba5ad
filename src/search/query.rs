use crate::config::Config;
use crate::error::SearchError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

pub const MIN_COUNT: u32 = 1;
pub const MAX_COUNT: u32 = 10;
pub const DEFAULT_COUNT: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    Off,
    Medium,
    High,
}

impl SafeSearch {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub query: String,
    pub count: Option<u32>,
    pub safe: Option<SafeSearch>,
    pub start_index: Option<u32>,
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), count: None, safe: None, start_index: None }
    }

    pub fn normalized_count(&self) -> u32 {
        self.count.unwrap_or(DEFAULT_COUNT).clamp(MIN_COUNT, MAX_COUNT)
    }
}

/// Builds the search API request URL. No I/O; `safe` and `start` are only sent when set.
pub fn build_search_url(config: &Config, options: &SearchOptions) -> Result<String, SearchError> {
    let mut url = Url::parse(&config.search_api_url)
        .map_err(|e| SearchError::new(format!("Invalid search API URL: {e}")))?;

    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("cx", &config.search_engine_id)
            .append_pair("key", &config.api_key)
            .append_pair("num", &options.normalized_count().to_string())
            .append_pair("q", options.query.trim())
            .append_pair("searchType", "image");
        if let Some(safe) = options.safe {
            pairs.append_pair("safe", safe.as_str());
        }
        if let Some(start) = options.start_index {
            pairs.append_pair("start", &start.to_string());
        }
    }

    Ok(url.into())
}
