//! Export manifest structure and persistence.
//!
//! The manifest is the durable record of identifier-to-filename bindings
//! across runs. It is the sole source of that binding: artifacts on disk
//! are never consulted to decide whether a script was seen before.
//!
//! Format:
//! ```json
//! {
//!   "scripts": [
//!     {
//!       "uuid": "550e8400-e29b-41d4-a716-446655440000",
//!       "name": "Dark Reader",
//!       "filename": "dark-reader.user.js",
//!       "metadata": { "name": "Dark Reader", "match": ["https://..."] },
//!       "synced_at": "2026-08-21T10:30:00+00:00"
//!     }
//!   ],
//!   "last_updated": "2026-08-21T10:30:00+00:00"
//! }
//! ```
//!
//! Entries are never pruned: an identifier that stops appearing keeps its
//! entry and its artifact, so nothing exported is ever destroyed by a
//! partial recovery.

use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::script::Metadata;

use super::errors::{ExportError, ExportResult};

/// Name of the manifest file inside the output directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// One exported script's persisted identity and snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Stable identifier the extension assigned to the script
    pub uuid: String,
    /// Display name at the time of the last snapshot
    pub name: String,
    /// Filename the identifier is bound to
    pub filename: String,
    /// Header attributes at the time of the last snapshot
    pub metadata: Metadata,
    /// When this entry's snapshot was last rewritten
    pub synced_at: String,
}

/// Durable cross-run state for one output directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub scripts: Vec<ManifestEntry>,
    pub last_updated: String,
}

impl Manifest {
    /// An empty manifest, as on a first run.
    pub fn empty() -> Self {
        Self {
            scripts: Vec::new(),
            last_updated: Utc::now().to_rfc3339(),
        }
    }

    /// Loads the manifest from `dir`.
    ///
    /// An absent file is a first run and an unparseable file is treated the
    /// same way: every recovered script then reconciles as newly added,
    /// which rebuilds the manifest from what is actually on hand.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(MANIFEST_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Self::empty(),
        };
        match serde_json::from_str(&content) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!("ignoring unreadable manifest {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    /// Looks up the persisted entry for an identifier.
    pub fn entry(&self, uuid: &str) -> Option<&ManifestEntry> {
        self.scripts.iter().find(|entry| entry.uuid == uuid)
    }

    /// Inserts or replaces the entry for `entry.uuid`.
    ///
    /// An existing entry keeps its position; new identifiers append. Entry
    /// order therefore reflects first-export order across the manifest's
    /// whole history.
    pub fn upsert(&mut self, entry: ManifestEntry) {
        match self.scripts.iter_mut().find(|e| e.uuid == entry.uuid) {
            Some(existing) => *existing = entry,
            None => self.scripts.push(entry),
        }
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> ExportResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ExportError::Manifest(format!("Failed to serialize manifest: {}", e)))
    }

    /// Writes the manifest into `dir` with a refreshed `last_updated`.
    pub fn store(&mut self, dir: &Path) -> ExportResult<()> {
        self.last_updated = Utc::now().to_rfc3339();
        let json = self.to_json()?;
        let path = dir.join(MANIFEST_FILE);
        fs::write(&path, json).map_err(|e| ExportError::write(&path, e))?;
        Ok(())
    }
}
