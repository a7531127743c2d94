//! Task store: the single owner of mutable board state.
//!
//! # Responsibility
//! - Own the task list, edit session, draft, active tab, display preference
//!   and notifications.
//! - Write the full task list through `TaskPersistence` after every task
//!   mutation, and the preference after every preference change.
//! - Notify registered observers of every state change.
//!
//! # Invariants
//! - Task identity is `TaskId`; positions shift on removal.
//! - Only `add` grows the list and only `remove` shrinks it.
//! - Blank text never reaches the list through `add`, `update` or
//!   `submit_draft`.
//! - At most one task is under edit. Starting another edit or removing the
//!   edited task ends the current session.
//! - A failed persistence write never undoes the in-memory mutation.
//! - Task and preference write errors are tracked per key; a good write to
//!   one key never clears the other key's error.
//! - Setting the tab or preference to its current value is a no-op.

use crate::config::CoreConfig;
use crate::model::category::{Category, CategoryTable};
use crate::model::notification::{Notification, NotificationCenter, NotificationId};
use crate::model::task::{today, TaskId, TaskRecord};
use crate::persistence::{PersistError, PersistResult, TaskPersistence};
use crate::repo::kv_repo::KeyValueStore;
use crate::view::{self, CategoryCount, CompletionSummary, Tab};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    TaskNotFound(TaskId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
        }
    }
}

impl Error for StoreError {}

/// State change delivered to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    TaskAdded(TaskId),
    TaskUpdated(TaskId),
    TaskRemoved(TaskId),
    TaskToggled { id: TaskId, completed: bool },
    EditStarted(TaskId),
    EditEnded(TaskId),
    DarkModeChanged(bool),
    TabChanged(Tab),
    NotificationsChanged { unread: usize },
}

pub type Observer = Box<dyn FnMut(&StoreEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Scratch input buffer the presentation layer fills and submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub date: NaiveDate,
    pub kind: String,
}

impl TaskDraft {
    pub fn new(date: NaiveDate, kind: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            date,
            kind: kind.into(),
        }
    }

    pub fn from_task(task: &TaskRecord) -> Self {
        Self {
            text: task.text.clone(),
            date: task.date,
            kind: task.kind.clone(),
        }
    }

    /// Whether a submit would do anything; drives the submit control.
    pub fn is_submittable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Added(TaskId),
    Updated(TaskId),
    /// Draft text was blank; nothing changed.
    Rejected,
}

/// Owner of all board state, generic over the durable backend.
pub struct TaskStore<S: KeyValueStore> {
    tasks: Vec<TaskRecord>,
    dark_mode: bool,
    active_tab: Tab,
    editing: Option<TaskId>,
    draft: TaskDraft,
    notifications: NotificationCenter,
    categories: CategoryTable,
    persistence: TaskPersistence<S>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
    tasks_sync_error: Option<PersistError>,
    preference_sync_error: Option<PersistError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncTarget {
    Tasks,
    Preference,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Restores tasks and preference from `persistence`.
    ///
    /// Unreadable stored state degrades to an empty list / light mode.
    pub fn open(persistence: TaskPersistence<S>, categories: CategoryTable) -> Self {
        let tasks = persistence.load_tasks();
        let dark_mode = persistence.load_preference();
        let draft = TaskDraft::new(today(), categories.default_id());
        info!(
            "event=store_open module=store status=ok task_count={} dark_mode={}",
            tasks.len(),
            dark_mode
        );
        Self {
            tasks,
            dark_mode,
            active_tab: Tab::default(),
            editing: None,
            draft,
            notifications: NotificationCenter::seeded(),
            categories,
            persistence,
            observers: Vec::new(),
            next_subscription: 0,
            tasks_sync_error: None,
            preference_sync_error: None,
        }
    }

    pub fn from_config(store: S, config: &CoreConfig) -> Self {
        Self::open(
            TaskPersistence::from_config(store, config),
            config.categories.clone(),
        )
    }

    // --- Reads ---

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Current list position of `id`, for renderers that number rows.
    pub fn position_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn id_at(&self, index: usize) -> Option<TaskId> {
        self.tasks.get(index).map(|task| task.id)
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn persistence(&self) -> &TaskPersistence<S> {
        &self.persistence
    }

    /// Error from the last task-list write, cleared by the next good one.
    pub fn tasks_sync_error(&self) -> Option<&PersistError> {
        self.tasks_sync_error.as_ref()
    }

    /// Error from the last preference write, cleared by the next good one.
    pub fn preference_sync_error(&self) -> Option<&PersistError> {
        self.preference_sync_error.as_ref()
    }

    /// Any outstanding write error, task list first.
    pub fn last_sync_error(&self) -> Option<&PersistError> {
        self.tasks_sync_error().or_else(|| self.preference_sync_error())
    }

    // --- Task mutations ---

    /// Appends a pending task. Returns `None` when `text` is blank.
    ///
    /// Blank `kind` stores the default category, unknown `kind` the fallback.
    pub fn add(&mut self, text: &str, date: NaiveDate, kind: &str) -> Option<TaskId> {
        let kind = self.categories.canonical_id(kind).to_string();
        let task = match TaskRecord::new(text, date, kind) {
            Ok(task) => task,
            Err(err) => {
                debug!("event=task_add module=store status=rejected reason={err}");
                return None;
            }
        };
        let id = task.id;
        self.tasks.push(task);
        self.sync_tasks();
        debug!(
            "event=task_add module=store status=ok task_count={}",
            self.tasks.len()
        );
        self.emit(StoreEvent::TaskAdded(id));
        Some(id)
    }

    /// Replaces text, date and type of `id`, keeping `completed`.
    ///
    /// Returns `Ok(false)` without changes when `text` is blank.
    pub fn update(
        &mut self,
        id: TaskId,
        text: &str,
        date: NaiveDate,
        kind: &str,
    ) -> StoreResult<bool> {
        let kind = self.categories.canonical_id(kind).to_string();
        let task = self.task_mut(id)?;
        if let Err(err) = task.apply_edit(text, date, kind) {
            debug!("event=task_update module=store status=rejected reason={err}");
            return Ok(false);
        }
        self.sync_tasks();
        self.emit(StoreEvent::TaskUpdated(id));
        Ok(true)
    }

    /// Removes `id` and returns the record. Later positions shift down.
    pub fn remove(&mut self, id: TaskId) -> StoreResult<TaskRecord> {
        let index = self.position_of(id).ok_or(StoreError::TaskNotFound(id))?;
        let removed = self.tasks.remove(index);
        self.sync_tasks();
        debug!(
            "event=task_remove module=store status=ok task_count={}",
            self.tasks.len()
        );
        self.emit(StoreEvent::TaskRemoved(id));
        if self.editing == Some(id) {
            self.editing = None;
            self.emit(StoreEvent::EditEnded(id));
        }
        Ok(removed)
    }

    /// Flips completion of `id` and returns the new value.
    pub fn toggle_completed(&mut self, id: TaskId) -> StoreResult<bool> {
        let completed = self.task_mut(id)?.toggle_completed();
        self.sync_tasks();
        self.emit(StoreEvent::TaskToggled { id, completed });
        Ok(completed)
    }

    // --- Edit session ---

    pub fn editing(&self) -> Option<TaskId> {
        self.editing
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut TaskDraft {
        &mut self.draft
    }

    /// Starts editing `id` and pre-fills the draft from it.
    ///
    /// An edit already in progress on another task is abandoned.
    pub fn begin_edit(&mut self, id: TaskId) -> StoreResult<&TaskDraft> {
        let draft = self
            .get(id)
            .map(TaskDraft::from_task)
            .ok_or(StoreError::TaskNotFound(id))?;
        if let Some(previous) = self.editing.filter(|previous| *previous != id) {
            debug!("event=edit_begin module=store status=abandoned_previous");
            self.emit(StoreEvent::EditEnded(previous));
        }
        self.draft = draft;
        self.editing = Some(id);
        self.emit(StoreEvent::EditStarted(id));
        Ok(&self.draft)
    }

    /// Applies the draft: updates the task under edit, or appends a new one.
    ///
    /// Clears the draft text on success; date and type carry over to the next
    /// entry.
    pub fn submit_draft(&mut self) -> StoreResult<SubmitOutcome> {
        if !self.draft.is_submittable() {
            return Ok(SubmitOutcome::Rejected);
        }
        let TaskDraft { text, date, kind } = self.draft.clone();

        let outcome = match self.editing {
            Some(id) => {
                self.update(id, &text, date, &kind)?;
                self.editing = None;
                self.emit(StoreEvent::EditEnded(id));
                SubmitOutcome::Updated(id)
            }
            None => match self.add(&text, date, &kind) {
                Some(id) => SubmitOutcome::Added(id),
                None => SubmitOutcome::Rejected,
            },
        };
        self.draft.text.clear();
        Ok(outcome)
    }

    // --- Tabs and projections ---

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        if self.active_tab == tab {
            return;
        }
        self.active_tab = tab;
        self.emit(StoreEvent::TabChanged(tab));
    }

    /// Tasks under the active tab, in list order.
    pub fn visible_tasks(&self) -> Vec<&TaskRecord> {
        view::filter_by_tab(&self.tasks, self.active_tab)
    }

    pub fn completion_summary(&self) -> CompletionSummary {
        view::aggregate_completion(&self.tasks)
    }

    pub fn category_counts(&self) -> Vec<CategoryCount<'_>> {
        view::aggregate_by_type(&self.tasks, &self.categories)
    }

    pub fn resolve_category(&self, task: &TaskRecord) -> &Category {
        view::resolve_category(task, &self.categories)
    }

    // --- Display preference ---

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Stores and persists the preference.
    ///
    /// An unchanged value is a no-op unless the previous preference write
    /// failed, in which case the write is retried without an event.
    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        let changed = self.dark_mode != dark_mode;
        if !changed && self.preference_sync_error.is_none() {
            return;
        }
        self.dark_mode = dark_mode;
        let result = self.persistence.save_preference(dark_mode);
        self.record_sync(SyncTarget::Preference, result);
        if changed {
            self.emit(StoreEvent::DarkModeChanged(dark_mode));
        }
    }

    /// Flips the preference and returns the new value.
    pub fn toggle_dark_mode(&mut self) -> bool {
        let dark_mode = !self.dark_mode;
        self.set_dark_mode(dark_mode);
        dark_mode
    }

    // --- Notifications ---

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.items()
    }

    pub fn unread_notification_count(&self) -> usize {
        self.notifications.unread_count()
    }

    /// Returns `false` when `id` is unknown or already read.
    pub fn mark_notification_read(&mut self, id: NotificationId) -> bool {
        let changed = self.notifications.mark_read(id);
        if changed {
            self.emit_notifications_changed();
        }
        changed
    }

    pub fn mark_all_notifications_read(&mut self) -> usize {
        let changed = self.notifications.mark_all_read();
        if changed > 0 {
            self.emit_notifications_changed();
        }
        changed
    }

    // --- Observers ---

    /// Registers a callback run synchronously after every state change.
    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns whether `id` was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != id);
        self.observers.len() != before
    }

    fn emit(&mut self, event: StoreEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&event);
        }
    }

    fn emit_notifications_changed(&mut self) {
        let unread = self.notifications.unread_count();
        self.emit(StoreEvent::NotificationsChanged { unread });
    }

    fn task_mut(&mut self, id: TaskId) -> StoreResult<&mut TaskRecord> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(StoreError::TaskNotFound(id))
    }

    fn sync_tasks(&mut self) {
        let result = self.persistence.save_tasks(&self.tasks);
        self.record_sync(SyncTarget::Tasks, result);
    }

    fn record_sync(&mut self, target: SyncTarget, result: PersistResult<()>) {
        let (event, slot) = match target {
            SyncTarget::Tasks => ("tasks_save", &mut self.tasks_sync_error),
            SyncTarget::Preference => ("preference_save", &mut self.preference_sync_error),
        };
        match result {
            Ok(()) => *slot = None,
            Err(err) => {
                warn!("event={event} module=store status=error error={err}");
                *slot = Some(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreEvent, SubmitOutcome, TaskStore};
    use crate::model::category::CategoryTable;
    use crate::persistence::TaskPersistence;
    use crate::repo::kv_repo::MemoryKeyValueStore;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn empty_store() -> TaskStore<MemoryKeyValueStore> {
        TaskStore::open(
            TaskPersistence::new(MemoryKeyValueStore::new()),
            CategoryTable::builtin(),
        )
    }

    #[test]
    fn add_canonicalizes_category() {
        let mut store = empty_store();
        let gym = store.add("Gym", day(2), "Gym").unwrap();
        let blank = store.add("Read", day(2), "").unwrap();
        let odd = store.add("Paint", day(2), "hobby").unwrap();

        assert_eq!(store.get(gym).unwrap().kind, "gym");
        assert_eq!(store.get(blank).unwrap().kind, "personal");
        assert_eq!(store.get(odd).unwrap().kind, "other");
    }

    #[test]
    fn begin_edit_replaces_previous_session() {
        let mut store = empty_store();
        let first = store.add("first", day(1), "work").unwrap();
        let second = store.add("second", day(2), "gym").unwrap();

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        store.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        store.begin_edit(first).unwrap();
        let draft = store.begin_edit(second).unwrap();
        assert_eq!(draft.text, "second");
        assert_eq!(draft.date, day(2));
        assert_eq!(draft.kind, "gym");
        assert_eq!(store.editing(), Some(second));
        assert_eq!(
            *events.borrow(),
            vec![
                StoreEvent::EditStarted(first),
                StoreEvent::EditEnded(first),
                StoreEvent::EditStarted(second),
            ]
        );
    }

    #[test]
    fn blank_draft_submit_is_rejected() {
        let mut store = empty_store();
        store.draft_mut().text = "   ".to_string();
        assert_eq!(store.submit_draft().unwrap(), SubmitOutcome::Rejected);
        assert!(store.is_empty());
        assert_eq!(store.draft().text, "   ");
    }

    #[test]
    fn set_active_tab_only_notifies_on_change() {
        let mut store = empty_store();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        store.subscribe(move |_| *sink.borrow_mut() += 1);

        store.set_active_tab(crate::view::Tab::All);
        store.set_active_tab(crate::view::Tab::Pending);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn set_dark_mode_unchanged_is_a_no_op() {
        let mut store = empty_store();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        store.subscribe(move |_| *sink.borrow_mut() += 1);

        store.set_dark_mode(false);
        assert_eq!(*count.borrow(), 0);
        assert!(store.persistence().backend().is_empty());

        store.set_dark_mode(true);
        store.set_dark_mode(true);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn set_dark_mode_unchanged_retries_failed_write() {
        let mut store = empty_store();
        store.persistence().backend().set_simulate_write_error(true);
        store.set_dark_mode(true);
        assert!(store.preference_sync_error().is_some());

        store.persistence().backend().set_simulate_write_error(false);
        store.set_dark_mode(true);
        assert!(store.preference_sync_error().is_none());
        assert!(store.persistence().load_preference());
    }
}
