//! Validation and normalization of the search API's JSON body.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub title: String,
    pub html_title: String,
    pub link: String,
    pub display_link: String,
    pub mime: String,
    pub image: ImageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub context_link: String,
    pub width: u64,
    pub height: u64,
    pub byte_size: u64,
    pub thumbnail_link: String,
    pub thumbnail_width: u64,
    pub thumbnail_height: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub items: Vec<SearchItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page_idx: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_idx: Option<u32>,
    pub search_terms: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    queries: RawQueries,
    #[serde(default)]
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQueries {
    request: Vec<PageQuery>,
    #[serde(default)]
    previous_page: Option<Vec<PageQuery>>,
    #[serde(default)]
    next_page: Option<Vec<PageQuery>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageQuery {
    #[serde(default)]
    total_results: Option<String>,
    search_terms: String,
    #[allow(dead_code)]
    count: u32,
    start_index: u32,
    #[allow(dead_code)]
    safe: String,
}

/// Validates a decoded body and extracts items and pagination cursors.
/// Any shape mismatch rejects the whole response.
pub fn normalize(body: serde_json::Value) -> Result<SearchResult, SearchError> {
    let raw: RawResponse = serde_json::from_value(body).map_err(invalid)?;

    let request = raw
        .queries
        .request
        .first()
        .ok_or_else(|| invalid("queries.request must contain at least one entry"))?;

    let items = raw.items.unwrap_or_default();
    for (i, item) in items.iter().enumerate() {
        check_url(i, "link", &item.link)?;
        check_url(i, "image.contextLink", &item.image.context_link)?;
        check_url(i, "image.thumbnailLink", &item.image.thumbnail_link)?;
    }

    Ok(SearchResult {
        previous_page_idx: first_start_index(raw.queries.previous_page.as_deref()),
        next_page_idx: first_start_index(raw.queries.next_page.as_deref()),
        search_terms: request.search_terms.clone(),
        total_results: request.total_results.as_deref().and_then(|t| t.trim().parse().ok()),
        items,
    })
}

fn first_start_index(pages: Option<&[PageQuery]>) -> Option<u32> {
    pages.and_then(|p| p.first()).map(|p| p.start_index)
}

fn check_url(index: usize, field: &str, value: &str) -> Result<(), SearchError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| invalid(format!("items[{index}].{field}: invalid URL ({e})")))
}

fn invalid(detail: impl std::fmt::Display) -> SearchError {
    SearchError::new(format!("Invalid response format from image search API: {detail}"))
}


#[cfg(test)]
mod tests {
    use super::fixtures::{body, item};
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_well_formed_response() {
        let result = normalize(body(3, None, Some(4))).unwrap();
        assert_eq!(result.items.len(), 3);
        assert_eq!(result.search_terms, "cat");
        assert_eq!(result.next_page_idx, Some(4));
        assert_eq!(result.previous_page_idx, None);
        assert_eq!(result.total_results, Some(1_250_000));
        assert_eq!(result.items[0].title, "Cat 1");
        assert_eq!(result.items[2].image.thumbnail_width, 120);
    }

    #[test]
    fn keeps_api_order() {
        let result = normalize(body(4, None, None)).unwrap();
        let titles: Vec<_> = result.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Cat 1", "Cat 2", "Cat 3", "Cat 4"]);
    }

    #[test]
    fn cursors_follow_page_blocks() {
        let middle = normalize(body(2, Some(1), Some(5))).unwrap();
        assert_eq!(middle.previous_page_idx, Some(1));
        assert_eq!(middle.next_page_idx, Some(5));

        let last = normalize(body(2, Some(3), None)).unwrap();
        assert_eq!(last.previous_page_idx, Some(3));
        assert_eq!(last.next_page_idx, None);
    }

    #[test]
    fn missing_items_means_no_results() {
        let mut raw = body(0, None, None);
        raw.as_object_mut().unwrap().remove("items");
        let result = normalize(raw).unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.search_terms, "cat");
    }

    #[test]
    fn missing_request_block_fails() {
        let mut raw = body(1, None, None);
        raw["queries"].as_object_mut().unwrap().remove("request");
        let err = normalize(raw).unwrap_err();
        assert!(err.message.starts_with("Invalid response format"));
        assert_eq!(err.status, None);

        let mut empty = body(1, None, None);
        empty["queries"]["request"] = json!([]);
        assert!(normalize(empty).is_err());
    }

    #[test]
    fn malformed_item_rejects_whole_response() {
        let mut raw = body(3, None, Some(4));
        raw["items"][1]["image"].as_object_mut().unwrap().remove("width");
        assert!(normalize(raw).is_err());

        let mut bad_link = body(1, None, None);
        bad_link["items"][0]["link"] = json!("not a url");
        let err = normalize(bad_link).unwrap_err();
        assert!(err.message.contains("items[0].link"));
    }

    #[test]
    fn wrong_types_fail() {
        let mut raw = body(1, None, None);
        raw["items"] = json!([item(1), { "title": 5 }]);
        assert!(normalize(raw).is_err());
        assert!(normalize(json!("nope")).is_err());
    }
}
