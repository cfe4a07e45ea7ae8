//! Task model and task store.
//!
//! The task store owns the ordered task collection for one principal. Order
//! is significant (drag-reorder semantics) and survives persistence round
//! trips. Every mutation writes the full collection back to storage before
//! returning, so reads after a mutation always see the durable state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::events::{Event, EventKind, EventSink};
use crate::storage::{tasks_key, Storage};

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// A nested completion-tracked item within a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            completed: false,
        }
    }
}

/// A unit of work with scheduling, priority and category metadata.
///
/// Invariants maintained by [`TaskStore`]:
/// - `id` is unique within a principal's collection
/// - `updated_at >= created_at`, refreshed on every mutation
/// - when `subtasks` is non-empty, `completed` equals the AND-reduction over
///   the subtasks' `completed` flags after every toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Task {
    /// Build a pending task with a fresh id and `created_at == updated_at`.
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            completed: false,
            created_at: now,
            updated_at: now,
            due_date: None,
            category: category.into(),
            priority: Priority::default(),
            subtasks: Vec::new(),
            notes: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = subtasks;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Ordered task collection for one principal, write-through persisted.
#[derive(Debug)]
pub struct TaskStore {
    storage: Storage,
    key: String,
    principal_id: String,
    tasks: Vec<Task>,
    events: Option<EventSink>,
}

impl TaskStore {
    /// Open the task store for a principal, starting empty when nothing is
    /// persisted.
    pub fn open(storage: Storage, principal_id: &str) -> Result<Self> {
        let key = tasks_key(principal_id);
        let tasks = storage.read_json(&key)?.unwrap_or_default();
        Ok(Self {
            storage,
            key,
            principal_id: principal_id.to_string(),
            tasks,
            events: None,
        })
    }

    /// Attach an event sink for mutation notifications.
    pub fn with_events(mut self, sink: EventSink) -> Self {
        self.events = Some(sink);
        self
    }

    /// Current in-memory snapshot, in collection order.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up a task by id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Bulk overwrite of the whole collection (import and batch edits).
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> Result<()> {
        self.tasks = tasks;
        self.persist()?;
        debug!(principal = %self.principal_id, count = self.tasks.len(), "tasks replaced");
        self.emit(EventKind::TasksReplaced, serde_json::json!({ "count": self.tasks.len() }))
    }

    /// Append a task to the end of the collection.
    ///
    /// A blank id gets a fresh uuid; `updated_at` is clamped up to
    /// `created_at` if the caller supplied an inverted pair.
    pub fn add(&mut self, mut task: Task) -> Result<&Task> {
        if task.title.trim().is_empty() {
            return Err(Error::InvalidArgument("task title cannot be empty".to_string()));
        }
        if task.id.trim().is_empty() {
            task.id = Uuid::new_v4().to_string();
        }
        if task.updated_at < task.created_at {
            task.updated_at = task.created_at;
        }

        self.tasks.push(task);
        self.persist()?;

        let index = self.tasks.len() - 1;
        let added = &self.tasks[index];
        debug!(principal = %self.principal_id, task = %added.id, title = %added.title, "task added");
        let payload = serde_json::json!({ "task_id": added.id });
        self.emit(EventKind::TaskAdded, payload)?;
        Ok(&self.tasks[index])
    }

    /// Replace the task with a matching id, refreshing `updated_at`.
    ///
    /// An unknown id is an error; this never inserts.
    pub fn update(&mut self, mut task: Task) -> Result<&Task> {
        let index = self
            .tasks
            .iter()
            .position(|existing| existing.id == task.id)
            .ok_or_else(|| Error::TaskNotFound(task.id.clone()))?;

        task.updated_at = Utc::now();
        if task.updated_at < task.created_at {
            task.updated_at = task.created_at;
        }
        self.tasks[index] = task;
        self.persist()?;

        let updated = &self.tasks[index];
        debug!(principal = %self.principal_id, task = %updated.id, "task updated");
        let payload = serde_json::json!({ "task_id": updated.id });
        self.emit(EventKind::TaskUpdated, payload)?;
        Ok(&self.tasks[index])
    }

    /// Remove the first task matching `id` in collection order.
    ///
    /// Ids should be unique, but first-match removal keeps duplicate ids from
    /// wiping more than one entry. Returns the removed task, or `None` (with
    /// the collection untouched and nothing persisted) when absent.
    pub fn delete(&mut self, id: &str) -> Result<Option<Task>> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            debug!(principal = %self.principal_id, task = %id, "delete miss");
            return Ok(None);
        };

        let removed = self.tasks.remove(index);
        self.persist()?;
        debug!(principal = %self.principal_id, task = %removed.id, "task deleted");
        self.emit(EventKind::TaskDeleted, serde_json::json!({ "task_id": removed.id }))?;
        Ok(Some(removed))
    }

    /// Move the element at `from` to position `to`, shifting the elements in
    /// between. Out-of-range indices leave the collection untouched.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.tasks.len();
        for index in [from, to] {
            if index >= len {
                return Err(Error::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        self.persist()?;
        debug!(principal = %self.principal_id, from, to, "tasks reordered");
        self.emit(EventKind::TasksReordered, serde_json::json!({ "from": from, "to": to }))
    }

    /// Flip a task's `completed` flag, cascading the new state to every
    /// subtask in the same update.
    ///
    /// This call is also the synchronization point at which UI-local timer
    /// state for the task stops; the store itself holds no timer state.
    pub fn toggle_complete(&mut self, id: &str) -> Result<&Task> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;

        // Parent and subtasks change together; persistence sees the final
        // state only.
        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        let completed = task.completed;
        for subtask in &mut task.subtasks {
            subtask.completed = completed;
        }
        task.updated_at = Utc::now();
        self.persist()?;

        let toggled = &self.tasks[index];
        debug!(
            principal = %self.principal_id,
            task = %toggled.id,
            completed = toggled.completed,
            "completion toggled"
        );
        let payload = serde_json::json!({ "task_id": toggled.id, "completed": toggled.completed });
        self.emit(EventKind::TaskCompletionToggled, payload)?;
        Ok(&self.tasks[index])
    }

    /// Flip one subtask's `completed` flag and recompute the parent's as the
    /// AND-reduction over all subtasks.
    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<&Task> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;

        let task = &mut self.tasks[index];
        let subtask = task
            .subtasks
            .iter_mut()
            .find(|subtask| subtask.id == subtask_id)
            .ok_or_else(|| Error::SubtaskNotFound {
                task_id: task_id.to_string(),
                subtask_id: subtask_id.to_string(),
            })?;

        subtask.completed = !subtask.completed;
        task.completed = task.subtasks.iter().all(|subtask| subtask.completed);
        task.updated_at = Utc::now();
        self.persist()?;

        let toggled = &self.tasks[index];
        debug!(
            principal = %self.principal_id,
            task = %toggled.id,
            subtask = %subtask_id,
            parent_completed = toggled.completed,
            "subtask toggled"
        );
        let payload = serde_json::json!({
            "task_id": toggled.id,
            "subtask_id": subtask_id,
            "parent_completed": toggled.completed,
        });
        self.emit(EventKind::SubtaskToggled, payload)?;
        Ok(&self.tasks[index])
    }

    fn persist(&self) -> Result<()> {
        self.storage.write_json(&self.key, &self.tasks)
    }

    fn emit(&mut self, kind: EventKind, data: serde_json::Value) -> Result<()> {
        if let Some(sink) = self.events.as_mut() {
            let event = Event::new(kind, Some(self.principal_id.clone())).with_data(data)?;
            sink.emit(&event)?;
        }
        Ok(())
    }
}
