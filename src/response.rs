//! Shapes pipeline results and failures into tool responses.
//!
//! Structured data goes in `_meta`; `content` holds the human-readable text.

use crate::error::{PersistError, SearchError};
use crate::outcome::Failure;
use crate::persist::DownloadResult;
use crate::search::SearchResult;
use rmcp::model::{CallToolResult, Content, Meta};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
    pub query: String,
    pub items_returned: usize,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page_start_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_start_index: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub index: u64,
    pub title: String,
    pub link: String,
    pub display_link: String,
    pub mime_type: String,
    pub image: ImageView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
    pub context_link: String,
    pub dimensions: String,
    pub size: String,
    pub thumbnail: ThumbnailView,
}

#[derive(Debug, Serialize)]
pub struct ThumbnailView {
    pub link: String,
    pub dimensions: String,
}

pub fn search_items(result: &SearchResult, start_index: Option<u32>) -> Vec<ItemView> {
    let offset = u64::from(start_index.unwrap_or(1));
    result
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| ItemView {
            index: offset + i as u64,
            title: item.title.clone(),
            link: item.link.clone(),
            display_link: item.display_link.clone(),
            mime_type: item.mime.clone(),
            image: ImageView {
                context_link: item.image.context_link.clone(),
                dimensions: format!("{}x{}", item.image.width, item.image.height),
                size: format!("{}KB", (item.image.byte_size as f64 / 1024.0).round()),
                thumbnail: ThumbnailView {
                    link: item.image.thumbnail_link.clone(),
                    dimensions: format!("{}x{}", item.image.thumbnail_width, item.image.thumbnail_height),
                },
            },
        })
        .collect()
}

pub fn search_success(result: &SearchResult, start_index: Option<u32>) -> CallToolResult {
    let summary = SearchSummary {
        query: result.search_terms.clone(),
        items_returned: result.items.len(),
        pagination: Pagination {
            previous_page_start_index: result.previous_page_idx,
            next_page_start_index: result.next_page_idx,
        },
    };
    let items = search_items(result, start_index);

    let next = result.next_page_idx.map_or_else(|| "none".to_string(), |n| n.to_string());
    let mut content = vec![Content::text(format!(
        "Search returned {} images. StartIndex of the next search page is: {next}",
        items.len()
    ))];
    content.extend(items.iter().map(|i| Content::text(format!("{}: {}", i.index, i.link))));

    let meta = json!({
        "itemsCount": result.items.len(),
        "searchTerms": result.search_terms,
        "previousPageIdx": result.previous_page_idx,
        "nextPageIdx": result.next_page_idx,
        "totalResults": result.total_results,
        "summary": summary,
        "items": items,
    });
    with_meta(CallToolResult::success(content), meta)
}

pub fn persist_success(result: &DownloadResult, workspace_path: &str) -> CallToolResult {
    let shown = result
        .file_persist_path
        .strip_prefix(Path::new(workspace_path))
        .unwrap_or(&result.file_persist_path);
    let kb = (result.size as f64 / 1024.0 * 100.0).round() / 100.0;

    let text = format!(
        "All done! Download result:\n- filePersistPath: {}\n- size: {kb}KB",
        shown.display()
    );
    let meta = json!({
        "success": true,
        "filePersistPath": result.file_persist_path,
        "size": result.size,
        "mimeType": result.mime_type,
    });
    with_meta(CallToolResult::success(vec![Content::text(text)]), meta)
}

pub fn search_failure(failure: &Failure<SearchError>) -> CallToolResult {
    let error = match failure {
        Failure::Known(e) => json!({
            "type": "SearchImageError",
            "message": e.message,
            "status": e.status,
            "statusText": e.status_text,
        }),
        Failure::Unexpected(msg) => unexpected(msg),
    };
    error_result(&failure.to_string(), error)
}

pub fn persist_failure(failure: &Failure<PersistError>) -> CallToolResult {
    let error = match failure {
        Failure::Known(e) => json!({
            "type": "PersistImageError",
            "message": e.message,
            "code": e.code,
        }),
        Failure::Unexpected(msg) => unexpected(msg),
    };
    error_result(&failure.to_string(), error)
}

fn unexpected(message: &str) -> Value {
    json!({ "type": "UnexpectedError", "message": message })
}

fn error_result(message: &str, error: Value) -> CallToolResult {
    let result = CallToolResult::error(vec![Content::text(format!("Error: {message}"))]);
    with_meta(result, json!({ "error": without_nulls(error) }))
}

fn with_meta(mut result: CallToolResult, meta: Value) -> CallToolResult {
    if let Value::Object(map) = without_nulls(meta) {
        result.meta = Some(Meta(map));
    }
    result
}

/// Drops absent optionals from the top level of an object.
fn without_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        other => other,
    }
}
