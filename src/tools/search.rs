use crate::search::query::{MAX_COUNT, MIN_COUNT};
use crate::search::{SafeSearch, SearchOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOOL_COUNT: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchImageParams {
    /// Search query for images
    pub query: String,

    /// Number of results to return (1-10, default: 2)
    #[serde(default)]
    pub count: Option<u32>,

    /// Safe search setting: "off", "medium" or "high" (API default when omitted)
    #[serde(default)]
    pub safe: Option<SafeSearch>,

    /// Starting index of the next search result page (not needed for the initial search)
    #[serde(default)]
    pub start_index: Option<u32>,
}

impl SearchImageParams {
    pub fn validate(&self) -> Result<(), String> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err("Query cannot be empty".into());
        }
        if query.len() > 2000 {
            return Err("Query exceeds 2000 characters".into());
        }
        if let Some(count) = self.count {
            if !(MIN_COUNT..=MAX_COUNT).contains(&count) {
                return Err(format!("count must be between {MIN_COUNT} and {MAX_COUNT}"));
            }
        }
        if self.start_index == Some(0) {
            return Err("startIndex must be a positive integer".into());
        }
        Ok(())
    }

    pub fn to_options(&self) -> SearchOptions {
        let mut options = SearchOptions::new(self.query.trim());
        options.count = Some(self.count.unwrap_or(DEFAULT_TOOL_COUNT));
        options.safe = self.safe;
        options.start_index = self.start_index;
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(json: serde_json::Value) -> SearchImageParams {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn defaults_apply_only_to_count() {
        let p = params(serde_json::json!({ "query": " cat " }));
        assert!(p.validate().is_ok());
        let options = p.to_options();
        assert_eq!(options.query, "cat");
        assert_eq!(options.count, Some(DEFAULT_TOOL_COUNT));
        assert_eq!(options.safe, None);
        assert_eq!(options.start_index, None);
    }

    #[test]
    fn camel_case_fields_are_accepted() {
        let p = params(serde_json::json!({ "query": "cat", "safe": "high", "startIndex": 11, "count": 10 }));
        assert!(p.validate().is_ok());
        assert_eq!(p.safe, Some(SafeSearch::High));
        assert_eq!(p.start_index, Some(11));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(params(serde_json::json!({ "query": "  " })).validate().is_err());
        assert!(params(serde_json::json!({ "query": "cat", "count": 0 })).validate().is_err());
        assert!(params(serde_json::json!({ "query": "cat", "count": 11 })).validate().is_err());
        assert!(params(serde_json::json!({ "query": "cat", "startIndex": 0 })).validate().is_err());
    }

    #[test]
    fn unknown_safe_level_does_not_parse() {
        let res: Result<SearchImageParams, _> =
            serde_json::from_value(serde_json::json!({ "query": "cat", "safe": "strict" }));
        assert!(res.is_err());
    }
}
