//! Core domain logic for the task board.
//! This crate is the single source of truth for task state and its
//! derived views; rendering lives outside it.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod repo;
pub mod store;
pub mod view;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::category::{Category, CategoryTable, CategoryTableError};
pub use model::notification::{
    Notification, NotificationCategory, NotificationCenter, NotificationId,
};
pub use model::task::{TaskId, TaskRecord, TaskValidationError};
pub use persistence::{PersistError, PersistResult, TaskPersistence};
pub use repo::kv_repo::{
    KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore,
};
pub use store::{
    StoreError, StoreEvent, StoreResult, SubmitOutcome, SubscriptionId, TaskDraft, TaskStore,
};
pub use view::{
    aggregate_by_type, aggregate_completion, category_chart, completion_chart, filter_by_tab,
    resolve_category, CategoryCount, ChartSlice, CompletionSummary, Tab,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
