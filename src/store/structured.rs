//! Structured store access through the LevelDB engine.
//!
//! The preferred read path opens the extension's store as a real database
//! and iterates every live key/value pair, which picks up exactly the
//! records a browser would see (tombstones honored, superseded writes
//! dropped). Opening requires the store lock and parses the manifest, so
//! this path fails when a browser still holds the store or when the store
//! metadata is damaged. Those failures are mapped to distinct errors and
//! the caller falls back to the raw segment scan.

use std::path::{Path, PathBuf};

use rusty_leveldb::{LdbIterator, Options, StatusCode, DB};
use tracing::debug;

use super::errors::{StoreError, StoreResult};
use super::raw;
use super::source::{ScriptMap, ScriptSource};

/// Name of the pointer file a usable LevelDB directory always carries
const CURRENT_FILE: &str = "CURRENT";

/// Structured accessor for one extension store directory
pub struct StructuredSource {
    dir: PathBuf,
}

impl StructuredSource {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// True when the directory carries database structure worth opening.
    ///
    /// Checked before `DB::open` because opening a directory that was never
    /// a database would create one.
    fn present(&self) -> bool {
        self.dir.join(CURRENT_FILE).is_file()
    }
}

impl ScriptSource for StructuredSource {
    fn recover(&mut self) -> StoreResult<Option<ScriptMap>> {
        if !self.present() {
            return Ok(None);
        }

        let mut options = Options::default();
        options.create_if_missing = false;

        let mut db = DB::open(&self.dir, options).map_err(|status| match status.code {
            StatusCode::LockError => StoreError::Locked(status.err),
            _ => StoreError::Unreadable(status.err),
        })?;

        let mut iter = db
            .new_iter()
            .map_err(|status| StoreError::Unreadable(status.err))?;

        let mut scripts = ScriptMap::new();
        let mut values = 0usize;
        while let Some((_key, value)) = iter.next() {
            values += 1;
            let text = String::from_utf8_lossy(&value);
            scripts.extend(raw::extract_scripts(&text));
        }
        debug!(
            "structured read of {}: {} values, {} scripts",
            self.dir.display(),
            values,
            scripts.len()
        );

        Ok(Some(scripts))
    }
}
