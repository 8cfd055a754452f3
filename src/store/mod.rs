//! SQLite storage for subscriptions and budgets

mod repository;
mod schema;
pub mod sqlite;

pub use repository::{
    SortKey, StoreError, StoreResult, SubscriptionFilter, SubscriptionRepository, UsageCount,
    sort_usage,
};
pub use schema::{SCHEMA_VERSION, create_schema, get_schema_version};
pub use sqlite::SqliteStore;
