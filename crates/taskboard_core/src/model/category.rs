//! Category configuration table.
//!
//! # Responsibility
//! - Hold the ordered `(id, display name, color)` table loaded once at
//!   initialization.
//! - Resolve raw task `type` values to table entries.
//!
//! # Invariants
//! - The table has at least one entry; the last entry is the fallback.
//! - Ids are unique under ASCII case-insensitive comparison.
//! - `default_id` names an entry of the table.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid hex color regex"));

const BUILTIN_DEFAULT_ID: &str = "personal";
const BUILTIN_CATEGORIES: &[(&str, &str, &str)] = &[
    ("work", "Work", "#3B82F6"),
    ("personal", "Personal", "#EC4899"),
    ("studying", "Studying", "#8B5CF6"),
    ("gym", "Gym", "#F97316"),
    ("health", "Health", "#10B981"),
    ("shopping", "Shopping", "#F59E0B"),
    ("other", "Other", "#6B7280"),
];

/// Display metadata for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Validation error for category tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryTableError {
    Empty,
    BlankId,
    BlankName(String),
    DuplicateId(String),
    InvalidColor { id: String, color: String },
    UnknownDefault(String),
}

impl Display for CategoryTableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "category table must contain at least one entry"),
            Self::BlankId => write!(f, "category id must not be blank"),
            Self::BlankName(id) => write!(f, "category `{id}` has a blank display name"),
            Self::DuplicateId(id) => write!(f, "duplicate category id `{id}`"),
            Self::InvalidColor { id, color } => {
                write!(f, "category `{id}` has invalid color `{color}`; expected #RRGGBB")
            }
            Self::UnknownDefault(id) => write!(f, "default category `{id}` is not in the table"),
        }
    }
}

impl Error for CategoryTableError {}

#[derive(Deserialize)]
struct RawCategoryTable {
    default_id: String,
    entries: Vec<Category>,
}

/// Ordered category set with a designated default and a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCategoryTable")]
pub struct CategoryTable {
    default_id: String,
    entries: Vec<Category>,
}

impl TryFrom<RawCategoryTable> for CategoryTable {
    type Error = CategoryTableError;

    fn try_from(raw: RawCategoryTable) -> Result<Self, Self::Error> {
        Self::new(raw.default_id, raw.entries)
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryTable {
    /// Builds a validated table.
    pub fn new(
        default_id: impl Into<String>,
        entries: Vec<Category>,
    ) -> Result<Self, CategoryTableError> {
        let table = Self {
            default_id: default_id.into(),
            entries,
        };
        table.validate()?;
        Ok(table)
    }

    /// Work, personal, studying, gym, health, shopping, other.
    pub fn builtin() -> Self {
        Self {
            default_id: BUILTIN_DEFAULT_ID.to_string(),
            entries: BUILTIN_CATEGORIES
                .iter()
                .map(|(id, name, color)| Category::new(*id, *name, *color))
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<(), CategoryTableError> {
        if self.entries.is_empty() {
            return Err(CategoryTableError::Empty);
        }
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(CategoryTableError::BlankId);
            }
            if entry.name.trim().is_empty() {
                return Err(CategoryTableError::BlankName(entry.id.clone()));
            }
            if !HEX_COLOR_RE.is_match(&entry.color) {
                return Err(CategoryTableError::InvalidColor {
                    id: entry.id.clone(),
                    color: entry.color.clone(),
                });
            }
            if self.entries[..index]
                .iter()
                .any(|earlier| earlier.id.eq_ignore_ascii_case(&entry.id))
            {
                return Err(CategoryTableError::DuplicateId(entry.id.clone()));
            }
        }
        if self.position(&self.default_id).is_none() {
            return Err(CategoryTableError::UnknownDefault(self.default_id.clone()));
        }
        Ok(())
    }

    pub fn entries(&self) -> &[Category] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    pub fn default_category(&self) -> &Category {
        self.resolve(&self.default_id)
    }

    /// The last entry; what unknown ids resolve to.
    pub fn fallback(&self) -> &Category {
        // Non-empty is checked by `validate` on every construction path.
        &self.entries[self.entries.len() - 1]
    }

    /// Table index of `id`, compared ASCII case-insensitively.
    pub fn position(&self, id: &str) -> Option<usize> {
        let id = id.trim();
        self.entries
            .iter()
            .position(|entry| entry.id.eq_ignore_ascii_case(id))
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.position(id).map(|index| &self.entries[index])
    }

    /// Index `id` resolves to, falling back to the last entry.
    pub fn resolve_position(&self, id: &str) -> usize {
        self.position(id).unwrap_or(self.entries.len() - 1)
    }

    /// Entry for `id`, or the fallback when `id` is unknown.
    pub fn resolve(&self, id: &str) -> &Category {
        &self.entries[self.resolve_position(id)]
    }

    /// Canonical id to store for user input.
    ///
    /// Blank input maps to the default category, unknown input to the
    /// fallback, known input to the table's spelling.
    pub fn canonical_id(&self, raw: &str) -> &str {
        if raw.trim().is_empty() {
            return &self.default_id;
        }
        &self.resolve(raw).id
    }
}
