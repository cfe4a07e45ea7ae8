//! Light/dark UI preference.
//!
//! Not part of the task engine proper, but it shares the same storage
//! mechanism under the fixed `theme` key.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{Storage, THEME_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Read the persisted theme preference, if any.
pub fn load(storage: &Storage) -> Result<Option<Theme>> {
    storage.read_json(THEME_KEY)
}

/// Persist the theme preference.
pub fn save(storage: &Storage, theme: Theme) -> Result<()> {
    storage.write_json(THEME_KEY, &theme)
}
