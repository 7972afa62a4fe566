// Service exports
pub mod appwrite;
pub mod cache;
pub mod postgres;

pub use appwrite::{AppwriteClient, AppwriteCollections, AppwriteError};
pub use cache::{CacheError, CacheKey, CacheManager};
pub use postgres::{ExclusionKind, ExclusionStats, PostgresClient, PostgresError};
