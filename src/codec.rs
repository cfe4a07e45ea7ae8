//! Import/export codec for the task collection.
//!
//! Export is a pretty-printed JSON array suitable for file download. Import
//! accepts an array of task-shaped objects, assigns every task a fresh id
//! (subtask ids are carried over when present), and normalizes the three
//! date fields; unparseable dates fall back to "now" rather than failing the
//! import. Only a document that is not
//! an array (or whose elements are not objects) rejects the import as a
//! whole — there is never a partial application.
//!
//! Field names accept both this crate's snake_case and the camelCase of the
//! original web app's exports.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::task::{Priority, Subtask, Task, TaskStore};

/// Serialize the full ordered collection, pretty-printed.
pub fn export(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

/// Parse a document into a fresh task collection.
///
/// Every element gets a new unique id (the incoming id is discarded) and
/// normalized `created_at` / `updated_at` / `due_date` fields. Missing
/// scalar fields default (`completed` false, `priority` medium).
pub fn import(document: &str) -> Result<Vec<Task>> {
    let parsed: Value = serde_json::from_str(document)?;
    let Value::Array(elements) = parsed else {
        return Err(Error::InvalidDocument(
            "expected a JSON array of tasks".to_string(),
        ));
    };

    let now = Utc::now();
    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            let raw: RawTask = serde_json::from_value(element).map_err(|err| {
                Error::InvalidDocument(format!("element {index} is not a task object: {err}"))
            })?;
            Ok(raw.into_task(now))
        })
        .collect()
}

/// Import a document and write it through the task store, so persistence
/// stays consistent with the in-memory collection.
///
/// The collection is untouched when the document is rejected.
pub fn import_into(store: &mut TaskStore, document: &str) -> Result<usize> {
    let tasks = import(document)?;
    let count = tasks.len();
    store.replace_all(tasks)?;
    Ok(count)
}

#[derive(Debug, Default, Deserialize)]
struct RawTask {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(default, alias = "createdAt")]
    created_at: Option<Value>,
    #[serde(default, alias = "updatedAt")]
    updated_at: Option<Value>,
    #[serde(default, alias = "dueDate")]
    due_date: Option<Value>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    subtasks: Vec<RawSubtask>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSubtask {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    completed: bool,
}

impl RawTask {
    fn into_task(self, now: DateTime<Utc>) -> Task {
        let created_at = normalize_date(self.created_at.as_ref(), now).unwrap_or(now);
        let mut updated_at = normalize_date(self.updated_at.as_ref(), now).unwrap_or(now);
        if updated_at < created_at {
            updated_at = created_at;
        }

        Task {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            description: self.description,
            completed: self.completed,
            created_at,
            updated_at,
            due_date: normalize_date(self.due_date.as_ref(), now),
            category: self.category,
            priority: self.priority,
            // Only the top-level id is regenerated; subtask ids travel with
            // their task and stay stable, fresh ones filling any gaps.
            subtasks: self
                .subtasks
                .into_iter()
                .map(|raw| Subtask {
                    id: if raw.id.trim().is_empty() {
                        Uuid::new_v4().to_string()
                    } else {
                        raw.id
                    },
                    title: raw.title,
                    completed: raw.completed,
                })
                .collect(),
            notes: self.notes,
        }
    }
}

/// Normalize a JSON date value.
///
/// Accepts RFC 3339 strings, bare `YYYY-MM-DD` dates (midnight UTC) and
/// millisecond epoch numbers. An absent, null or empty value is `None`; a
/// present but unparseable value falls back to `now`.
fn normalize_date(value: Option<&Value>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let value = value?;
    match value {
        Value::Null => None,
        Value::String(raw) if raw.trim().is_empty() => None,
        Value::String(raw) => Some(parse_date_str(raw).unwrap_or_else(|| {
            warn!(raw = %raw, "unparseable date in import, defaulting to now");
            now
        })),
        Value::Number(number) => Some(
            number
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .unwrap_or_else(|| {
                    warn!(raw = %number, "unparseable epoch date in import, defaulting to now");
                    now
                }),
        ),
        other => {
            warn!(raw = %other, "unparseable date in import, defaulting to now");
            Some(now)
        }
    }
}

fn parse_date_str(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use tempfile::TempDir;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::new("Buy milk", "Shopping")
                .with_priority(Priority::Low)
                .with_notes("2%"),
            Task::new("Ship report", "Work")
                .with_description("quarterly numbers")
                .with_subtasks(vec![Subtask::new("draft"), Subtask::new("review")]),
        ]
    }

    #[test]
    fn test_roundtrip_preserves_fields_except_ids() {
        let original = sample_tasks();
        let document = export(&original).unwrap();
        let imported = import(&document).unwrap();

        assert_eq!(imported.len(), original.len());
        for (before, after) in original.iter().zip(&imported) {
            assert_ne!(before.id, after.id);
            assert_eq!(before.title, after.title);
            assert_eq!(before.description, after.description);
            assert_eq!(before.completed, after.completed);
            assert_eq!(before.category, after.category);
            assert_eq!(before.priority, after.priority);
            assert_eq!(before.notes, after.notes);
            assert_eq!(before.subtasks.len(), after.subtasks.len());
            for (sub_before, sub_after) in before.subtasks.iter().zip(&after.subtasks) {
                assert_eq!(sub_before.id, sub_after.id, "subtask ids travel intact");
                assert_eq!(sub_before.title, sub_after.title);
                assert_eq!(sub_before.completed, sub_after.completed);
            }
        }
    }

    #[test]
    fn test_non_array_document_rejected() {
        assert!(matches!(
            import("{\"title\": \"not a list\"}").unwrap_err(),
            Error::InvalidDocument(_)
        ));
        assert!(matches!(
            import("[1, 2, 3]").unwrap_err(),
            Error::InvalidDocument(_)
        ));
        assert!(import("not json at all").is_err());
    }

    #[test]
    fn test_unparseable_dates_default_to_now() {
        let document = r#"[{
            "title": "Odd dates",
            "category": "Work",
            "created_at": "last tuesday",
            "updated_at": "???",
            "due_date": "soon"
        }]"#;

        let before = Utc::now();
        let imported = import(document).unwrap();
        let after = Utc::now();

        let task = &imported[0];
        assert!(task.created_at >= before && task.created_at <= after);
        assert!(task.updated_at >= task.created_at);
        let due = task.due_date.unwrap();
        assert!(due >= before && due <= after);
    }

    #[test]
    fn test_bare_date_and_epoch_accepted() {
        let document = r#"[{
            "title": "Formats",
            "category": "Work",
            "created_at": "2024-05-01",
            "updated_at": 1714857600000,
            "due_date": "2024-05-20T10:30:00Z"
        }]"#;

        let task = &import(document).unwrap()[0];
        assert_eq!(
            task.created_at,
            NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_time(NaiveTime::MIN)
                .and_utc()
        );
        assert_eq!(
            task.updated_at,
            DateTime::from_timestamp_millis(1714857600000).unwrap()
        );
        assert!(task.due_date.is_some());
    }

    #[test]
    fn test_missing_fields_default() {
        let imported = import(r#"[{"title": "Bare"}]"#).unwrap();
        let task = &imported[0];
        assert_eq!(task.title, "Bare");
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.due_date.is_none());
        assert!(task.subtasks.is_empty());
    }

    #[test]
    fn test_subtask_ids_preserved_or_filled() {
        let document = r#"[{
            "title": "Parent",
            "category": "Work",
            "subtasks": [
                { "id": "sub-1", "title": "kept", "completed": true },
                { "title": "no id" }
            ]
        }]"#;

        let task = &import(document).unwrap()[0];
        assert_eq!(task.subtasks[0].id, "sub-1");
        assert!(task.subtasks[0].completed);
        assert!(Uuid::parse_str(&task.subtasks[1].id).is_ok());
    }

    #[test]
    fn test_camel_case_documents_accepted() {
        let document = r#"[{
            "title": "From the web app",
            "category": "Personal",
            "createdAt": "2024-05-01T09:00:00Z",
            "updatedAt": "2024-05-02T09:00:00Z",
            "dueDate": "2024-05-03"
        }]"#;

        let task = &import(document).unwrap()[0];
        assert_eq!(task.created_at.to_rfc3339(), "2024-05-01T09:00:00+00:00");
        assert!(task.due_date.is_some());
    }

    #[test]
    fn test_import_into_writes_through_store() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        let mut store = TaskStore::open(storage.clone(), "u1").unwrap();
        store.replace_all(sample_tasks()).unwrap();

        let document = export(store.list()).unwrap();
        let count = import_into(&mut store, &document).unwrap();
        assert_eq!(count, 2);

        // Persisted state matches the imported collection.
        let reopened = TaskStore::open(storage, "u1").unwrap();
        assert_eq!(reopened.list(), store.list());
    }

    #[test]
    fn test_rejected_import_leaves_store_unchanged() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        let mut store = TaskStore::open(storage, "u1").unwrap();
        store.replace_all(sample_tasks()).unwrap();
        let before: Vec<Task> = store.list().to_vec();

        assert!(import_into(&mut store, "{\"oops\": true}").is_err());
        assert_eq!(store.list(), before.as_slice());
    }
}
