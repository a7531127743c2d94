//! Task record model.
//!
//! # Responsibility
//! - Define the canonical task record persisted under the `tasks` key.
//! - Own day-granularity date encoding for the JSON wire shape.
//!
//! # Invariants
//! - `id` is stable for the lifetime of a record and never reused.
//! - `text` is non-blank whenever a record is created or updated through
//!   `TaskRecord::new` / `TaskRecord::apply_edit`.
//! - `date` carries no time-of-day; it is written as `YYYY-MM-DD`.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task record.
pub type TaskId = Uuid;

const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Validation error for task write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Text is empty or whitespace-only.
    EmptyText,
    /// Caller supplied the nil UUID as identity.
    NilId,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be blank"),
            Self::NilId => write!(f, "task id must not be nil"),
        }
    }
}

impl Error for TaskValidationError {}

/// One to-do item.
///
/// Serialized as `{id, text, date, completed, type}`. Payloads written before
/// records carried an `id` still decode; they receive a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: TaskId,
    pub text: String,
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    /// Category id. Serialized as `type` to match the storage schema.
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl TaskRecord {
    /// Creates a pending task with a generated id.
    ///
    /// `text` is stored trimmed.
    pub fn new(
        text: &str,
        date: NaiveDate,
        kind: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        Self::with_id(Uuid::new_v4(), text, date, kind)
    }

    /// Creates a pending task with a caller-provided id.
    pub fn with_id(
        id: TaskId,
        text: &str,
        date: NaiveDate,
        kind: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        if id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        Ok(Self {
            id,
            text: normalize_text(text)?,
            date,
            completed: false,
            kind: kind.into(),
        })
    }

    /// Replaces every editable field, keeping `id` and `completed`.
    ///
    /// Leaves the record untouched when `text` is blank.
    pub fn apply_edit(
        &mut self,
        text: &str,
        date: NaiveDate,
        kind: impl Into<String>,
    ) -> Result<(), TaskValidationError> {
        self.text = normalize_text(text)?;
        self.date = date;
        self.kind = kind.into();
        Ok(())
    }

    /// Flips completion and returns the new value.
    pub fn toggle_completed(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }
}

/// Current local calendar date, the default for new tasks.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a stored date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (as written by browser
/// `toISOString()`), and zone-less `YYYY-MM-DDTHH:MM:SS`. Time-of-day is
/// discarded.
pub fn parse_wire_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, WIRE_DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive());
    }
    value
        .parse::<NaiveDateTime>()
        .ok()
        .map(|timestamp| timestamp.date())
}

/// Formats a date the way it is persisted.
pub fn format_wire_date(date: NaiveDate) -> String {
    date.format(WIRE_DATE_FORMAT).to_string()
}

fn normalize_text(text: &str) -> Result<String, TaskValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyText);
    }
    Ok(trimmed.to_string())
}

mod wire_date {
    use super::{format_wire_date, parse_wire_date};
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_wire_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_wire_date(&raw)
            .ok_or_else(|| Error::custom(format!("invalid ISO-8601 date `{raw}`")))
    }
}
