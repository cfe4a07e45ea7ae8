//! Category store: per-principal ordered category labels.
//!
//! A principal with no persisted categories sees the default seed, but the
//! seed is not written to disk until the first mutation.

use tracing::debug;

use crate::error::{Error, Result};
use crate::events::{Event, EventKind, EventSink};
use crate::storage::{categories_key, Storage};

/// Labels seeded for a principal with no persisted categories.
pub const DEFAULT_CATEGORIES: [&str; 3] = ["Personal", "Work", "Shopping"];

/// Ordered category labels for one principal.
#[derive(Debug)]
pub struct CategoryStore {
    storage: Storage,
    key: String,
    principal_id: String,
    labels: Vec<String>,
    events: Option<EventSink>,
}

impl CategoryStore {
    /// Open the category store for a principal, falling back to the default
    /// seed when nothing is persisted.
    pub fn open(storage: Storage, principal_id: &str) -> Result<Self> {
        Self::open_with_seed(
            storage,
            principal_id,
            DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Open with an explicit seed (from configuration).
    pub fn open_with_seed(
        storage: Storage,
        principal_id: &str,
        seed: Vec<String>,
    ) -> Result<Self> {
        let key = categories_key(principal_id);
        let labels = storage.read_json(&key)?.unwrap_or(seed);
        Ok(Self {
            storage,
            key,
            principal_id: principal_id.to_string(),
            labels,
            events: None,
        })
    }

    /// Attach an event sink for mutation notifications.
    pub fn with_events(mut self, sink: EventSink) -> Self {
        self.events = Some(sink);
        self
    }

    /// Labels in insertion order.
    pub fn list(&self) -> &[String] {
        &self.labels
    }

    /// Append a label, persisting immediately.
    ///
    /// Returns `Ok(false)` without persisting when the exact label is already
    /// present (case-sensitive match).
    pub fn add(&mut self, label: &str) -> Result<bool> {
        let label = label.trim();
        if label.is_empty() {
            return Err(Error::InvalidArgument(
                "category label cannot be empty".to_string(),
            ));
        }
        if self.labels.iter().any(|existing| existing == label) {
            return Ok(false);
        }

        self.labels.push(label.to_string());
        self.storage.write_json(&self.key, &self.labels)?;
        debug!(principal = %self.principal_id, %label, "category added");

        if let Some(sink) = self.events.as_mut() {
            let event = Event::new(EventKind::CategoryAdded, Some(self.principal_id.clone()))
                .with_data(serde_json::json!({ "label": label }))?;
            sink.emit(&event)?;
        }
        Ok(true)
    }
}
