//! Identity store: the active principal and its persisted session.
//!
//! Authentication is deliberately demo-grade: there is no server-side
//! verification and the credential secret is stored in plaintext under the
//! `user` key. Signing out removes only the session; the principal's task and
//! category data stays on disk.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::events::{Event, EventKind, EventSink};
use crate::storage::{Storage, USER_KEY};

/// The authenticated user context that scopes all stored data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Plaintext by design; real authentication is out of scope.
    pub credential_secret: String,
}

/// Profile supplied at signup. An absent id gets a fresh uuid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub credential_secret: String,
}

/// Holds the active principal and persists the session under `user`.
#[derive(Debug)]
pub struct IdentityStore {
    storage: Storage,
    current: Option<Principal>,
    events: Option<EventSink>,
}

impl IdentityStore {
    /// Create a store, restoring a persisted session if one exists.
    pub fn new(storage: Storage) -> Result<Self> {
        let current = storage.read_json(USER_KEY)?;
        Ok(Self {
            storage,
            current,
            events: None,
        })
    }

    /// Attach an event sink for mutation notifications.
    pub fn with_events(mut self, sink: EventSink) -> Self {
        self.events = Some(sink);
        self
    }

    /// The active principal, if any.
    pub fn current(&self) -> Option<&Principal> {
        self.current.as_ref()
    }

    /// Replace the active principal and persist the session.
    ///
    /// Always succeeds: there is no credential verification in this design.
    pub fn sign_in(&mut self, principal: Principal) -> Result<&Principal> {
        validate_principal(&principal)?;
        self.storage.write_json(USER_KEY, &principal)?;
        debug!(principal = %principal.id, "signed in");
        self.emit(EventKind::SignedIn, &principal.id)?;
        Ok(self.current.insert(principal))
    }

    /// Create a principal from a profile and activate it.
    ///
    /// No collision check: if the id already exists, last write wins.
    pub fn sign_up(&mut self, profile: Profile) -> Result<&Principal> {
        let principal = Principal {
            id: profile.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: profile.name,
            email: profile.email,
            credential_secret: profile.credential_secret,
        };
        self.sign_in(principal)
    }

    /// Clear the active principal and remove the persisted session.
    ///
    /// Soft logout: task and category data for the principal is retained.
    pub fn sign_out(&mut self) -> Result<()> {
        self.storage.remove(USER_KEY)?;
        if let Some(principal) = self.current.take() {
            debug!(principal = %principal.id, "signed out");
            self.emit(EventKind::SignedOut, &principal.id)?;
        }
        Ok(())
    }

    fn emit(&mut self, kind: EventKind, principal_id: &str) -> Result<()> {
        if let Some(sink) = self.events.as_mut() {
            sink.emit(&Event::new(kind, Some(principal_id.to_string())))?;
        }
        Ok(())
    }
}

fn validate_principal(principal: &Principal) -> Result<()> {
    if principal.id.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "principal id cannot be empty".to_string(),
        ));
    }
    if principal.email.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "principal email cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn principal(id: &str) -> Principal {
        Principal {
            id: id.to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            credential_secret: "hunter2".to_string(),
        }
    }

    #[test]
    fn test_sign_in_persists_session() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();

        let mut store = IdentityStore::new(storage.clone()).unwrap();
        assert!(store.current().is_none());

        store.sign_in(principal("u1")).unwrap();
        assert_eq!(store.current().unwrap().id, "u1");

        // A fresh store restores the same session.
        let restored = IdentityStore::new(storage).unwrap();
        assert_eq!(restored.current().unwrap().id, "u1");
    }

    #[test]
    fn test_sign_up_assigns_id_when_absent() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        let mut store = IdentityStore::new(storage).unwrap();

        store
            .sign_up(Profile {
                id: None,
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                credential_secret: "secret".to_string(),
            })
            .unwrap();

        let id = store.current().unwrap().id.clone();
        assert!(!id.is_empty());
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_sign_out_is_soft() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        let mut store = IdentityStore::new(storage.clone()).unwrap();

        store.sign_in(principal("u1")).unwrap();
        storage
            .write_json(&crate::storage::tasks_key("u1"), &vec!["placeholder"])
            .unwrap();

        store.sign_out().unwrap();
        assert!(store.current().is_none());
        assert!(!storage.contains(USER_KEY));
        // Task data survives logout.
        assert!(storage.contains(&crate::storage::tasks_key("u1")));
    }

    #[test]
    fn test_sign_in_replaces_active_principal() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        let mut store = IdentityStore::new(storage).unwrap();

        store.sign_in(principal("u1")).unwrap();
        store.sign_in(principal("u2")).unwrap();
        assert_eq!(store.current().unwrap().id, "u2");
    }

    #[test]
    fn test_session_changes_emit_events() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        let log = temp.path().join("events.jsonl");

        let sink = crate::events::EventSink::file(&log).unwrap();
        let mut store = IdentityStore::new(storage).unwrap().with_events(sink);

        store.sign_in(principal("u1")).unwrap();
        store.sign_out().unwrap();
        // Signing out with no active principal emits nothing.
        store.sign_out().unwrap();

        let content = std::fs::read_to_string(&log).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("signed_in"));
        assert!(lines[1].contains("signed_out"));
    }

    #[test]
    fn test_empty_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        let mut store = IdentityStore::new(storage).unwrap();

        let mut bad = principal("  ");
        let err = store.sign_in(bad.clone()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        bad.id = "u1".to_string();
        bad.email = String::new();
        let err = store.sign_in(bad).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
