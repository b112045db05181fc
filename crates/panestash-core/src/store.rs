//! Name-keyed snapshot store with a JSON file as its persisted form.
//!
//! Entries are kept most-recently-added-or-updated first. The file is a
//! versioned envelope:
//!
//! ```json
//! { "version": 1, "layouts": [ { "name": "...", "saved_at": 0, "snapshot": { ... } } ] }
//! ```
//!
//! Loading never fails: a missing, unreadable or corrupt file yields an empty
//! store, and individual entries that do not describe a valid layout are
//! dropped with a warning.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::layout_tree::LayoutSnapshot;

/// Current persisted envelope version.
pub const STORE_FORMAT_VERSION: u32 = 1;

/// A snapshot stored under a unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedConfig {
    pub name: String,
    /// Epoch milliseconds of the last add or update.
    #[serde(default)]
    pub saved_at: u64,
    pub snapshot: LayoutSnapshot,
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    version: u32,
    layouts: &'a [NamedConfig],
}

/// Envelope as read from disk; entries are decoded one by one so a single
/// bad entry does not take the rest down with it.
#[derive(Deserialize)]
struct StoreFileRaw {
    version: u32,
    #[serde(default)]
    layouts: Vec<serde_json::Value>,
}

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u64::try_from(d.as_millis()).ok())
        .unwrap_or(0)
}

/// Ordered collection of [`NamedConfig`], front = most recent.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    path: Option<PathBuf>,
    entries: Vec<NamedConfig>,
}

impl SnapshotStore {
    /// Empty store persisted at `path`. Call [`Self::load`] to read it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            entries: Vec::new(),
        }
    }

    /// Empty store with no persisted form; `save` is a no-op.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert or replace `name`, moving it to the front.
    pub fn put(&mut self, name: impl Into<String>, snapshot: LayoutSnapshot) {
        let name = name.into();
        let replaced = self.remove(&name).is_some();
        debug!(layout = %name, replaced, "storing layout");
        self.entries.insert(
            0,
            NamedConfig {
                name,
                saved_at: epoch_ms(),
                snapshot,
            },
        );
    }

    /// Exact, case-sensitive lookup.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&NamedConfig> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Remove `name`; returns whether it existed.
    pub fn delete(&mut self, name: &str) -> bool {
        self.remove(name).is_some()
    }

    fn remove(&mut self, name: &str) -> Option<NamedConfig> {
        let pos = self.entries.iter().position(|e| e.name == name)?;
        Some(self.entries.remove(pos))
    }

    /// Names front to back, most recent first.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    #[must_use]
    pub fn entries(&self) -> &[NamedConfig] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the in-memory entries with the persisted ones.
    ///
    /// Never fails; on any read or parse problem the store ends up empty.
    /// Returns the number of entries loaded.
    pub fn load(&mut self) -> usize {
        self.entries.clear();
        let Some(path) = self.path.clone() else {
            return 0;
        };
        match read_entries(&path) {
            Ok(entries) => {
                self.entries = entries;
                info!(path = %path.display(), layouts = self.entries.len(), "layout store loaded");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "layout store unreadable, starting empty");
            }
        }
        self.entries.len()
    }

    /// Rewrite the persisted form atomically (temp file, then rename).
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        write_entries(path, &self.entries)?;
        debug!(path = %path.display(), layouts = self.entries.len(), "layout store saved");
        Ok(())
    }
}

/// Read and sanitize the entries stored at `path`. A missing file is empty.
pub fn read_entries(path: &Path) -> Result<Vec<NamedConfig>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| StoreError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let raw: StoreFileRaw =
        serde_json::from_str(&content).map_err(|e| StoreError::Parse(e.to_string()))?;

    if raw.version > STORE_FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: raw.version,
            supported: STORE_FORMAT_VERSION,
        });
    }

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(raw.layouts.len());
    for (i, value) in raw.layouts.into_iter().enumerate() {
        let entry: NamedConfig = match serde_json::from_value(value) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %path.display(), entry = i, error = %e, "dropping undecodable layout entry");
                continue;
            }
        };
        if let Err(e) = entry.snapshot.validate() {
            warn!(layout = %entry.name, error = %e, "dropping invalid layout entry");
            continue;
        }
        if !seen.insert(entry.name.clone()) {
            warn!(layout = %entry.name, "dropping duplicate layout entry");
            continue;
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// Write `entries` to `path` in the versioned envelope.
pub fn write_entries(path: &Path, entries: &[NamedConfig]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Write {
                path: parent.display().to_string(),
                reason: e.to_string(),
            })?;
        }
    }

    let content = serde_json::to_string_pretty(&StoreFileRef {
        version: STORE_FORMAT_VERSION,
        layouts: entries,
    })
    .map_err(|e| StoreError::Serialize(e.to_string()))?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content).map_err(|e| StoreError::Write {
        path: tmp_path.display().to_string(),
        reason: e.to_string(),
    })?;
    std::fs::rename(&tmp_path, path).map_err(|e| StoreError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    Ok(())
}
