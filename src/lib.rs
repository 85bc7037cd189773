pub mod config;
pub mod enrich;
pub mod error;
pub mod store;
pub mod trigger;

pub use config::Config;
pub use enrich::{enrich, join_permissions, resolve_permissions, PERMISSIONS_CLAIM};
pub use error::{ConfigError, EnrichError, StoreError};
pub use store::{DynamoPermissionStore, InMemoryPermissionStore, PermissionRecord, PermissionStore};
pub use trigger::PreTokenGenerationEvent;
