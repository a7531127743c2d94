//! Persistence adapter between the task store and a key-value backend.
//!
//! # Responsibility
//! - Serialize the whole task list as one JSON array under the tasks key.
//! - Serialize the display preference as `"true"`/`"false"` under its own key.
//! - Offer typed `try_*` reads plus never-failing `load_*` wrappers that log
//!   and fall back to empty/default values.
//!
//! # Invariants
//! - Saves always write the full snapshot, never a delta.
//! - A missing key is not an error.
//! - Log lines carry counts and keys only, never task text.

use crate::config::{CoreConfig, DEFAULT_PREFERENCE_KEY, DEFAULT_TASKS_KEY};
use crate::model::task::TaskRecord;
use crate::repo::kv_repo::{KeyValueStore, KvError};
use log::{debug, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type PersistResult<T> = Result<T, PersistError>;

#[derive(Debug)]
pub enum PersistError {
    Store(KvError),
    /// Stored value exists but cannot be decoded.
    Malformed { key: String, reason: String },
    Encode(serde_json::Error),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Malformed { key, reason } => {
                write!(f, "malformed value under key `{key}`: {reason}")
            }
            Self::Encode(err) => write!(f, "failed to encode tasks: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Malformed { .. } => None,
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<KvError> for PersistError {
    fn from(value: KvError) -> Self {
        Self::Store(value)
    }
}

/// Reads and writes task snapshots and the display preference.
pub struct TaskPersistence<S: KeyValueStore> {
    store: S,
    tasks_key: String,
    preference_key: String,
}

impl<S: KeyValueStore> TaskPersistence<S> {
    /// Uses the default `tasks` and `darkMode` keys.
    pub fn new(store: S) -> Self {
        Self::with_keys(store, DEFAULT_TASKS_KEY, DEFAULT_PREFERENCE_KEY)
    }

    pub fn with_keys(
        store: S,
        tasks_key: impl Into<String>,
        preference_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            tasks_key: tasks_key.into(),
            preference_key: preference_key.into(),
        }
    }

    pub fn from_config(store: S, config: &CoreConfig) -> Self {
        Self::with_keys(
            store,
            config.tasks_key.as_str(),
            config.preference_key.as_str(),
        )
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    pub fn tasks_key(&self) -> &str {
        &self.tasks_key
    }

    pub fn preference_key(&self) -> &str {
        &self.preference_key
    }

    /// Reads the stored task list.
    ///
    /// # Errors
    /// - `Store` when the backend read fails.
    /// - `Malformed` when the value is not a JSON array.
    ///
    /// Array elements that do not decode as a task (bad shape, unparseable
    /// date) are skipped with a warning. Duplicate ids are re-keyed so ids
    /// stay unique within the list.
    pub fn try_load_tasks(&self) -> PersistResult<Vec<TaskRecord>> {
        let Some(raw) = self.store.get(&self.tasks_key)? else {
            debug!(
                "event=tasks_load module=persistence status=empty key={}",
                self.tasks_key
            );
            return Ok(Vec::new());
        };

        let values: Vec<serde_json::Value> =
            serde_json::from_str(&raw).map_err(|err| PersistError::Malformed {
                key: self.tasks_key.clone(),
                reason: err.to_string(),
            })?;

        let mut seen = HashSet::with_capacity(values.len());
        let mut tasks = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            let mut task = match serde_json::from_value::<TaskRecord>(value) {
                Ok(task) => task,
                Err(err) => {
                    warn!(
                        "event=tasks_load module=persistence status=record_skipped index={} error={}",
                        index, err
                    );
                    continue;
                }
            };
            if task.id.is_nil() || !seen.insert(task.id) {
                warn!(
                    "event=tasks_load module=persistence status=record_rekeyed index={}",
                    index
                );
                task.id = Uuid::new_v4();
                seen.insert(task.id);
            }
            tasks.push(task);
        }

        debug!(
            "event=tasks_load module=persistence status=ok key={} count={}",
            self.tasks_key,
            tasks.len()
        );
        Ok(tasks)
    }

    /// Reads the stored task list, degrading to an empty list on any error.
    pub fn load_tasks(&self) -> Vec<TaskRecord> {
        self.try_load_tasks().unwrap_or_else(|err| {
            warn!(
                "event=tasks_load module=persistence status=fallback key={} error={}",
                self.tasks_key, err
            );
            Vec::new()
        })
    }

    /// Overwrites the stored task list with `tasks`.
    pub fn save_tasks(&self, tasks: &[TaskRecord]) -> PersistResult<()> {
        let encoded = serde_json::to_string(tasks).map_err(PersistError::Encode)?;
        self.store.set(&self.tasks_key, &encoded)?;
        debug!(
            "event=tasks_save module=persistence status=ok key={} count={}",
            self.tasks_key,
            tasks.len()
        );
        Ok(())
    }

    /// Reads the dark-mode flag. Missing key is `false`.
    pub fn try_load_preference(&self) -> PersistResult<bool> {
        match self.store.get(&self.preference_key)?.as_deref().map(str::trim) {
            None => Ok(false),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(PersistError::Malformed {
                key: self.preference_key.clone(),
                reason: format!("expected `true` or `false`, got `{other}`"),
            }),
        }
    }

    /// Reads the dark-mode flag, degrading to `false` on any error.
    pub fn load_preference(&self) -> bool {
        self.try_load_preference().unwrap_or_else(|err| {
            warn!(
                "event=preference_load module=persistence status=fallback key={} error={}",
                self.preference_key, err
            );
            false
        })
    }

    pub fn save_preference(&self, dark_mode: bool) -> PersistResult<()> {
        self.store
            .set(&self.preference_key, if dark_mode { "true" } else { "false" })?;
        Ok(())
    }
}
