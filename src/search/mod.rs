pub mod client;
pub mod query;
pub mod response;

pub use client::SearchClient;
pub use query::{SafeSearch, SearchOptions};
pub use response::SearchResult;
