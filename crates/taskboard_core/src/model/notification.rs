//! In-memory notifications shown next to the task list.
//!
//! Notifications are seeded with fixed sample content and are never
//! persisted or derived from tasks.

use serde::{Deserialize, Serialize};

pub type NotificationId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    Reminder,
    Achievement,
    Tip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub category: NotificationCategory,
    pub read: bool,
}

/// Ordered notification list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationCenter {
    items: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new(items: Vec<Notification>) -> Self {
        Self { items }
    }

    /// Startup sample content.
    pub fn seeded() -> Self {
        let sample = [
            (
                1,
                "Don't forget to review today's tasks",
                NotificationCategory::Reminder,
            ),
            (
                2,
                "You completed three tasks yesterday",
                NotificationCategory::Achievement,
            ),
            (
                3,
                "Group tasks by type to see where your time goes",
                NotificationCategory::Tip,
            ),
        ];
        Self::new(
            sample
                .into_iter()
                .map(|(id, message, category)| Notification {
                    id,
                    message: message.to_string(),
                    category,
                    read: false,
                })
                .collect(),
        )
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|item| !item.read).count()
    }

    /// Marks one notification read. Returns `false` for unknown or
    /// already-read ids.
    pub fn mark_read(&mut self, id: NotificationId) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) if !item.read => {
                item.read = true;
                true
            }
            _ => false,
        }
    }

    /// Returns how many notifications changed state.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for item in self.items.iter_mut().filter(|item| !item.read) {
            item.read = true;
            changed += 1;
        }
        changed
    }
}
