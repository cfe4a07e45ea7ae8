//! Durable storage layer for taskbook.
//!
//! A string-keyed blob store over a single directory, mirroring the
//! key/value storage the engine was designed against:
//!
//! ```text
//! <root>/
//!   user.json              # serialized active principal (absent when signed out)
//!   tasks_<id>.json        # ordered task collection per principal
//!   categories_<id>.json   # ordered category labels per principal
//!   theme.json             # light/dark UI preference
//! ```
//!
//! Every value is a pretty-printed JSON document written atomically
//! (temp file + rename) so readers never observe a partial write. There is
//! deliberately no locking: the engine is single-writer by contract, and two
//! concurrent sessions race last-write-wins.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

/// Fixed key for the active principal session.
pub const USER_KEY: &str = "user";

/// Fixed key for the UI theme preference.
pub const THEME_KEY: &str = "theme";

/// Key for a principal's task collection.
pub fn tasks_key(principal_id: &str) -> String {
    format!("tasks_{}", sanitize_key(principal_id))
}

/// Key for a principal's category labels.
pub fn categories_key(principal_id: &str) -> String {
    format!("categories_{}", sanitize_key(principal_id))
}

/// String-keyed JSON blob store rooted at a directory.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Open (creating if necessary) a store rooted at the given directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Open a store in the platform data directory.
    pub fn open_default() -> Result<Self> {
        let root = default_root().ok_or_else(|| {
            Error::InvalidArgument("could not determine a platform data directory".to_string())
        })?;
        Self::open(root)
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }

    /// Read and deserialize the value under `key`. Absent keys are `Ok(None)`.
    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let value: T = serde_json::from_str(&content)?;
        Ok(Some(value))
    }

    /// Serialize and write the value under `key` (atomic).
    pub fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.write_atomic(&self.key_path(key), json.as_bytes())
    }

    /// Remove the value under `key`. Returns whether a value was present.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }

    /// Whether a value exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.key_path(key).exists()
    }

    /// Write data atomically using temp file + rename.
    ///
    /// Ensures readers never see partial writes; the file is either fully
    /// written or untouched.
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;

        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

/// Map a key to a filesystem-safe name.
///
/// Principal ids come from user input (emails, uuids) and become part of the
/// file name, so anything outside `[A-Za-z0-9_-]` is replaced.
fn sanitize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for ch in key.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        "_".to_string()
    } else {
        out
    }
}

fn default_root() -> Option<PathBuf> {
    ProjectDirs::from("", "", "taskbook").map(|dirs| dirs.data_dir().to_path_buf())
}
