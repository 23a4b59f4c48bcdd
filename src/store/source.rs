//! Record source selection and merging.
//!
//! Two sources implement one capability: the structured accessor opens the
//! store as a database, the raw source scans segment files as bytes. The
//! strategy tries structured first and falls back to raw when structured
//! access fails or comes back empty, so a locked or damaged store still
//! yields whatever records its segment files expose.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::errors::StoreResult;
use super::raw;
use super::segments::{self, SegmentKind};
use super::structured::StructuredSource;

/// Recovered records: identifier to script text.
///
/// Ordered by identifier so every downstream pass (merging, reconciling,
/// listing) visits records in the same sequence on every run.
pub type ScriptMap = BTreeMap<String, String>;

/// One way of recovering scripts from an extension store.
///
/// `Ok(None)` means the source found nothing it can open (the store is
/// absent in this mode); `Ok(Some(_))` is a completed read, possibly empty.
pub trait ScriptSource {
    fn recover(&mut self) -> StoreResult<Option<ScriptMap>>;
}

/// Fallback source scanning segment files directly
pub struct RawSegmentSource {
    dir: PathBuf,
}

impl RawSegmentSource {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }
}

impl ScriptSource for RawSegmentSource {
    fn recover(&mut self) -> StoreResult<Option<ScriptMap>> {
        if !self.dir.is_dir() {
            return Ok(None);
        }
        let segments = segments::list_segments(&self.dir)?;
        if segments.is_empty() {
            return Ok(None);
        }

        let mut scripts = ScriptMap::new();
        // Logs first; tables only when the logs yielded nothing. Recent
        // writes live in the logs and the tables repeat them, so a hit in
        // the logs makes the (much larger) tables redundant.
        for pass in [SegmentKind::Log, SegmentKind::Table] {
            if pass == SegmentKind::Table && !scripts.is_empty() {
                break;
            }
            for segment in segments.iter().filter(|s| s.kind == pass) {
                match segment.read_text() {
                    Ok(text) => {
                        scripts.extend(raw::extract_scripts(&text));
                    }
                    Err(e) => {
                        warn!("skipping unreadable segment {}: {}", segment.path.display(), e);
                    }
                }
            }
        }

        Ok(Some(scripts))
    }
}

/// Result of recovering one store: the merged records plus whether a lock
/// was observed on the structured path. The lock flag lets the caller tell
/// "store is empty" from "store was unreachable and the segments held
/// nothing readable".
#[derive(Debug, Default)]
pub struct StoreRecovery {
    pub scripts: ScriptMap,
    pub locked: bool,
}

/// Recovers every script the store still exposes.
///
/// Extraction-level faults are contained here: a failed structured open
/// degrades to the raw scan and a failed segment read degrades to the
/// remaining segments, with a warning each. Nothing in this path aborts
/// the run.
pub fn recover_store(dir: &Path) -> StoreRecovery {
    let mut recovery = StoreRecovery::default();

    match StructuredSource::new(dir).recover() {
        Ok(Some(scripts)) if !scripts.is_empty() => {
            recovery.scripts = scripts;
            return recovery;
        }
        Ok(Some(_)) => debug!("structured read of {} found no scripts", dir.display()),
        Ok(None) => debug!("no structured store at {}", dir.display()),
        Err(e) => {
            if e.is_locked() {
                recovery.locked = true;
            }
            warn!("structured read of {} failed ({}); trying raw scan", dir.display(), e);
        }
    }

    match RawSegmentSource::new(dir).recover() {
        Ok(Some(scripts)) => recovery.scripts.extend(scripts),
        Ok(None) => {}
        Err(e) => warn!("raw scan of {} failed: {}", dir.display(), e),
    }

    recovery
}
