pub mod persist;
pub mod search;

pub use persist::PersistImageParams;
pub use search::SearchImageParams;
