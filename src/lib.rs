//! taskbook - Task Collection Engine
//!
//! This library provides the core of a single-user task-management
//! application: per-principal task and category stores over a durable
//! string-keyed blob store, with pure filter and statistics functions and a
//! JSON import/export codec. UI layers (routing, widgets, theming) are
//! external collaborators; the store operations here are their only mutation
//! surface.
//!
//! # Core Concepts
//!
//! - **Principal**: the authenticated user context scoping all stored data
//! - **Task Store**: ordered, write-through-persisted task collection
//! - **Filter Engine**: pure order-preserving filtering over criteria
//! - **Statistics Engine**: completion rates over rolling calendar windows
//! - **Import/Export Codec**: transportable JSON documents through the store
//!
//! # Module Organization
//!
//! - `config`: configuration loading from `taskbook.toml`
//! - `error`: error types and result aliases
//! - `storage`: string-keyed durable JSON storage
//! - `identity`: active principal and session persistence
//! - `category`: per-principal category labels
//! - `task`: task model and the task store
//! - `filter`: filter criteria and predicates
//! - `stats`: completion-rate aggregation
//! - `codec`: import/export of the task collection
//! - `events`: JSONL mutation events for external collaborators
//! - `theme`: light/dark preference on the shared storage

pub mod category;
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod identity;
pub mod stats;
pub mod storage;
pub mod task;
pub mod theme;

pub use category::CategoryStore;
pub use error::{Error, Result};
pub use filter::Criteria;
pub use identity::{IdentityStore, Principal};
pub use stats::CompletionStats;
pub use storage::Storage;
pub use task::{Priority, Subtask, Task, TaskStore};
