use super::mime;
use crate::config::Config;
use crate::error::{ConfigError, PersistError, PersistErrorCode};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const FALLBACK_FILE_NAME: &str = "image";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    pub file_persist_path: PathBuf,
    pub mime_type: String,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
}

impl ImageFetcher {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ConfigError::Invalid(format!("user agent: {e}")))?,
        );

        let client = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { client })
    }

    /// Downloads `url` into `target_dir` (already sandbox-validated).
    ///
    /// Each gate fails with its own code and nothing is retried. The returned size
    /// is read back from disk, not taken from `content-length`.
    pub async fn fetch_image(&self, url: &str, target_dir: &Path) -> Result<DownloadResult, PersistError> {
        let resp = self.client.get(url).send().await.map_err(|e| {
            PersistError::new(PersistErrorCode::FetchFailed, format!("Failed to fetch image: {e}"))
        })?;
        debug!("Fetched {url}: HTTP {}", resp.status());

        let status = resp.status();
        if !status.is_success() {
            return Err(PersistError::new(
                PersistErrorCode::HttpError,
                format!("HTTP error {}: {}", status.as_u16(), status.canonical_reason().unwrap_or("")),
            ));
        }
        if matches!(status, StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT) {
            return Err(PersistError::new(PersistErrorCode::NoResponseBody, "No response body received"));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let Some(expected_ext) = mime::extension_for(&content_type) else {
            return Err(PersistError::new(
                PersistErrorCode::InvalidContentType,
                format!("Invalid content type: {content_type}. Only image files are allowed."),
            ));
        };

        let file_name = file_name_for(url, expected_ext);
        let file_persist_path = target_dir.join(&file_name);
        debug!("Saving {url} as {}", file_persist_path.display());

        if let Err(e) = stream_to_file(resp, &file_persist_path).await {
            if let Err(rm) = tokio::fs::remove_file(&file_persist_path).await {
                warn!("Could not remove partial file {}: {rm}", file_persist_path.display());
            }
            return Err(PersistError::new(PersistErrorCode::SaveFailed, format!("Failed to save file: {e}")));
        }

        let meta = tokio::fs::metadata(&file_persist_path).await.map_err(|e| {
            PersistError::new(PersistErrorCode::StatFailed, format!("Failed to get file stats: {e}"))
        })?;

        Ok(DownloadResult {
            file_persist_path,
            mime_type: content_type,
            size: meta.len(),
        })
    }
}

async fn stream_to_file(resp: reqwest::Response, path: &Path) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut body = resp.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(std::io::Error::other)?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    file.sync_all().await
}

/// Last path segment of `url`, or `image` when the path has none.
fn url_file_name(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.path_segments().and_then(|mut s| s.next_back()).map(str::to_string))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.into())
}

/// Keeps the URL's extension only when it agrees with the content type.
pub fn file_name_for(url: &str, expected_ext: &str) -> String {
    let name = url_file_name(url);
    let path = Path::new(&name);
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| name.clone());

    match path.extension().map(|e| e.to_string_lossy()) {
        Some(ext) if format!(".{}", ext.to_lowercase()) == expected_ext => format!("{stem}.{ext}"),
        _ => format!("{stem}{expected_ext}"),
    }
}
