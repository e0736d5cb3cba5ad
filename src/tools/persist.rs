use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersistImageParams {
    /// URL of the image
    pub url: String,

    /// Folder where to save the image (relative to the current workspace)
    pub target_path: String,

    /// The current workspace absolute path
    pub workspace_path: String,
}

impl PersistImageParams {
    pub fn validate(&self) -> Result<(), String> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err("URL cannot be empty".into());
        }
        if url.len() > 2048 {
            return Err("URL exceeds 2048 characters".into());
        }
        let parsed = url::Url::parse(url).map_err(|e| format!("Invalid URL: {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err("URL must use http or https scheme".into());
        }
        if !Path::new(&self.workspace_path).is_absolute() {
            return Err("workspacePath must be an absolute path".into());
        }
        Ok(())
    }
}
