use crate::config::Config;
use crate::error::ConfigError;
use crate::outcome::settle;
use crate::persist::{prepare_target_path, ImageFetcher};
use crate::response;
use crate::search::SearchClient;
use crate::tools::{PersistImageParams, SearchImageParams};

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use tracing::{error, info};

#[derive(Clone)]
pub struct ImageSearchServer {
    pub search: SearchClient,
    pub fetcher: ImageFetcher,
}

impl ImageSearchServer {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            search: SearchClient::new(config)?,
            fetcher: ImageFetcher::new(config)?,
        })
    }
}

#[tool_router]
impl ImageSearchServer {
    #[tool(description = r#"
    Searches for images using the image search API and returns one page of results.

    The `query` is the text to search images for.
    The `count` is the number of results to return (1-10, default 2).
    The `safe` is the safe search level: "off", "medium" or "high".
    The `startIndex` is the start index of the result page to fetch. Leave it out for the
    first page and pass the returned next page start index to continue paging.

    Returns a summary line with the next page start index, followed by one
    `<index>: <link>` line per image. Full item details are in the result metadata.
    "#)]
    pub async fn search_image(&self, Parameters(params): Parameters<SearchImageParams>) -> Result<CallToolResult, McpError> {
        params.validate().map_err(|msg| McpError::invalid_params(msg, None))?;
        info!(
            "[search_image] query={:?} count={:?} safe={:?} start_index={:?}",
            params.query, params.count, params.safe, params.start_index
        );

        let options = params.to_options();
        let client = self.search.clone();
        let outcome = settle(async move { client.search(&options).await }).await;

        Ok(match outcome {
            Ok(result) => {
                info!(
                    "[search_image] {} items, next page: {:?}",
                    result.items.len(),
                    result.next_page_idx
                );
                response::search_success(&result, params.start_index)
            }
            Err(failure) => {
                error!("[search_image] failed: {failure}");
                response::search_failure(&failure)
            }
        })
    }

    #[tool(description = r#"
    Downloads an image from a URL and saves it inside the current workspace.

    The `url` must be a valid http or https URL pointing at an image.
    The `targetPath` is the folder to save into, relative to the workspace. It is created
    if missing and must stay inside the workspace.
    The `workspacePath` is the absolute path of the current workspace.

    Only image content types (jpeg, png, gif, webp, svg, bmp, tiff, avif) are accepted.
    The file is named after the URL's last path segment, with the extension matching the
    served content type.
    "#)]
    pub async fn persist_image(&self, Parameters(params): Parameters<PersistImageParams>) -> Result<CallToolResult, McpError> {
        params.validate().map_err(|msg| McpError::invalid_params(msg, None))?;
        info!(
            "[persist_image] url={} target_path={} workspace_path={}",
            params.url, params.target_path, params.workspace_path
        );

        let fetcher = self.fetcher.clone();
        let (url, workspace, target) = (
            params.url.trim().to_string(),
            params.workspace_path.clone(),
            params.target_path.clone(),
        );
        let outcome = settle(async move {
            let dir = prepare_target_path(&workspace, &target).await?;
            fetcher.fetch_image(&url, &dir).await
        })
        .await;

        Ok(match outcome {
            Ok(result) => {
                info!(
                    "[persist_image] saved {} ({} bytes, {})",
                    result.file_persist_path.display(),
                    result.size,
                    result.mime_type
                );
                response::persist_success(&result, &params.workspace_path)
            }
            Err(failure) => {
                error!("[persist_image] failed: {failure}");
                response::persist_failure(&failure)
            }
        })
    }
}

#[tool_handler(router = Self::tool_router())]
impl ServerHandler for ImageSearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "image-search".into(),
                title: None,
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
