pub mod fetcher;
pub mod mime;
pub mod sandbox;

pub use fetcher::{DownloadResult, ImageFetcher};
pub use sandbox::prepare_target_path;
