// Service exports
pub mod cache;
pub mod directory;
pub mod pairing;
pub mod postgres;
pub mod sources;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use directory::CachedDirectory;
pub use pairing::{PairingError, PairingService};
pub use postgres::{PostgresClient, PostgresError};
pub use sources::{ConflictProvider, HistoryProvider, PlayerDirectory};
