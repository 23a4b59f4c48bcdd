//! Reconciliation of recovered scripts against the output directory.
//!
//! For every recovered record the reconciler resolves a stable filename,
//! classifies what happened relative to the previous run, and applies
//! exactly the filesystem changes that classification requires. Rules:
//!
//! - The manifest is the sole source of identifier-to-filename bindings.
//!   An identifier without a manifest entry is new, even if a file with
//!   its resolved name already exists on disk.
//! - An identifier keeps its previous filename while its name's slug is
//!   unchanged, so collision suffixes stay stable across runs.
//! - Filenames are unique across the manifest at all times. A slug that
//!   would land on a filename held by a different identifier gets the
//!   first characters of its own identifier appended.
//! - Nothing is deleted for identifiers that stopped appearing; their
//!   entries and artifacts are retained.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use crate::script;
use crate::store::ScriptMap;

use super::errors::{ExportError, ExportResult};
use super::manifest::{Manifest, ManifestEntry};
use super::slug::slugify;

/// Suffix carried by every exported script filename
pub const SCRIPT_SUFFIX: &str = ".user.js";

/// Identifier characters appended to disambiguate a colliding slug
const FRAGMENT_LEN: usize = 8;

/// Outcome of reconciling one script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    /// No prior manifest binding, or the bound artifact was missing
    Added,
    /// Artifact existed with different bytes and was overwritten
    Updated,
    /// The resolved filename differs from the previous binding
    Renamed,
    /// Byte-identical artifact already present under the bound name
    Unchanged,
}

/// One script's reconciliation result
#[derive(Debug, Clone)]
pub struct ExportRecord {
    pub uuid: String,
    pub name: String,
    pub filename: String,
    pub status: ExportStatus,
}

/// Aggregate counts across one run.
///
/// `removed` is always zero under the retention rule; it stays in the
/// summary so the history of a repository reads uniformly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncCounts {
    pub added: usize,
    pub updated: usize,
    pub renamed: usize,
    pub removed: usize,
}

impl SyncCounts {
    pub fn has_changes(&self) -> bool {
        self.added > 0 || self.updated > 0 || self.renamed > 0 || self.removed > 0
    }
}

impl std::fmt::Display for SyncCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} added; {} removed; {} updated; {} renamed",
            self.added, self.removed, self.updated, self.renamed
        )
    }
}

/// Everything one reconciliation pass produced
#[derive(Debug)]
pub struct ExportOutcome {
    pub records: Vec<ExportRecord>,
    pub counts: SyncCounts,
    /// True when a manifest rewrite happened
    pub manifest_written: bool,
}

/// Reconciliation engine for one output directory
pub struct Reconciler {
    output_dir: PathBuf,
    manifest: Manifest,
}

impl Reconciler {
    /// Creates the output directory if needed and loads prior state.
    pub fn open(output_dir: &Path) -> ExportResult<Self> {
        fs::create_dir_all(output_dir).map_err(|e| ExportError::create_dir(output_dir, e))?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            manifest: Manifest::load(output_dir),
        })
    }

    /// Reconciles every recovered script against the output directory.
    ///
    /// Scripts are processed in identifier order. The manifest is rewritten
    /// at the end only when at least one record changed status and
    /// `write_manifest` allows it; a run where everything came back
    /// unchanged leaves the file untouched.
    pub fn run(&mut self, scripts: &ScriptMap, write_manifest: bool) -> ExportResult<ExportOutcome> {
        let mut outcome = ExportOutcome {
            records: Vec::with_capacity(scripts.len()),
            counts: SyncCounts::default(),
            manifest_written: false,
        };

        // Filenames already bound in the manifest are claimed up front, so
        // a new script can never take a name a retained or not-yet-visited
        // identifier still holds, regardless of processing order.
        let mut claimed: HashMap<String, String> = self
            .manifest
            .scripts
            .iter()
            .map(|entry| (entry.filename.clone(), entry.uuid.clone()))
            .collect();

        for (uuid, content) in scripts {
            let record = self.reconcile_one(uuid, content, &mut claimed)?;
            match record.status {
                ExportStatus::Added => outcome.counts.added += 1,
                ExportStatus::Updated => outcome.counts.updated += 1,
                ExportStatus::Renamed => outcome.counts.renamed += 1,
                ExportStatus::Unchanged => {}
            }
            outcome.records.push(record);
        }

        if write_manifest && outcome.counts.has_changes() {
            self.manifest.store(&self.output_dir)?;
            outcome.manifest_written = true;
        }

        Ok(outcome)
    }

    fn reconcile_one(
        &mut self,
        uuid: &str,
        content: &str,
        claimed: &mut HashMap<String, String>,
    ) -> ExportResult<ExportRecord> {
        let metadata = script::parse_metadata(content);
        let name = script::display_name(&metadata, uuid).to_string();
        let slug = slugify(&name);

        let prior = self.manifest.entry(uuid).cloned();

        // Keep the previous filename while the slug is unchanged; a changed
        // slug re-derives the filename and classifies as a rename below.
        let candidate = match &prior {
            Some(entry) if slugify(&entry.name) == slug => entry.filename.clone(),
            _ => format!("{}{}", slug, SCRIPT_SUFFIX),
        };

        let resolved = match claimed.get(&candidate) {
            Some(owner) if owner != uuid => {
                let fragment = &uuid[..FRAGMENT_LEN.min(uuid.len())];
                format!("{}-{}{}", slug, fragment, SCRIPT_SUFFIX)
            }
            _ => candidate,
        };
        claimed.insert(resolved.clone(), uuid.to_string());

        let path = self.output_dir.join(&resolved);

        // Move the artifact when the binding's filename changed. The old
        // file may be gone already (manual cleanup); that is not an error.
        let mut renamed = false;
        if let Some(entry) = &prior {
            if entry.filename != resolved {
                renamed = true;
                let old_path = self.output_dir.join(&entry.filename);
                if old_path.is_file() {
                    if path.is_file() {
                        fs::remove_file(&old_path)
                            .map_err(|e| ExportError::remove(&old_path, e))?;
                    } else {
                        fs::rename(&old_path, &path)
                            .map_err(|e| ExportError::rename(&old_path, &path, e))?;
                    }
                }
                debug!("{} moved from {} to {}", uuid, entry.filename, resolved);
            }
        }

        let existing = match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(ExportError::read(&path, e)),
        };

        let current = existing.as_deref() == Some(content.as_bytes());
        if !current {
            fs::write(&path, content).map_err(|e| ExportError::write(&path, e))?;
        }

        let status = if prior.is_none() {
            ExportStatus::Added
        } else if renamed {
            ExportStatus::Renamed
        } else if existing.is_none() {
            ExportStatus::Added
        } else if current {
            ExportStatus::Unchanged
        } else {
            ExportStatus::Updated
        };

        // Unchanged records keep their stored snapshot and synced_at, so a
        // no-op run rewrites nothing.
        if status != ExportStatus::Unchanged {
            self.manifest.upsert(ManifestEntry {
                uuid: uuid.to_string(),
                name: name.clone(),
                filename: resolved.clone(),
                metadata,
                synced_at: Utc::now().to_rfc3339(),
            });
        }

        Ok(ExportRecord {
            uuid: uuid.to_string(),
            name,
            filename: resolved,
            status,
        })
    }

    /// The manifest as reconciled so far.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

#[cfg(test)]
mod tests {
    use super::super::manifest::MANIFEST_FILE;
    use super::*;
    use tempfile::TempDir;

    const ID_A: &str = "550e8400-e29b-41d4-a716-446655440000";
    const ID_B: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

    fn script(name: &str, body: &str) -> String {
        format!(
            "// ==UserScript==\n// @name {}\n// ==/UserScript==\n{}\n",
            name, body
        )
    }

    fn run(dir: &Path, scripts: &ScriptMap) -> ExportOutcome {
        let mut reconciler = Reconciler::open(dir).unwrap();
        reconciler.run(scripts, true).unwrap()
    }

    #[test]
    fn test_first_run_adds_everything() {
        let temp_dir = TempDir::new().unwrap();
        let mut scripts = ScriptMap::new();
        scripts.insert(ID_A.to_string(), script("Alpha Tool", "a();"));
        scripts.insert(ID_B.to_string(), script("Beta Tool", "b();"));

        let outcome = run(temp_dir.path(), &scripts);
        assert_eq!(outcome.counts.added, 2);
        assert_eq!(outcome.counts.updated, 0);
        assert!(outcome.manifest_written);
        assert!(temp_dir.path().join("alpha-tool.user.js").is_file());
        assert!(temp_dir.path().join("beta-tool.user.js").is_file());
    }

    #[test]
    fn test_second_run_is_all_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let mut scripts = ScriptMap::new();
        scripts.insert(ID_A.to_string(), script("Alpha Tool", "a();"));

        run(temp_dir.path(), &scripts);
        let second = run(temp_dir.path(), &scripts);

        assert!(!second.counts.has_changes());
        assert!(!second.manifest_written);
        assert_eq!(second.records[0].status, ExportStatus::Unchanged);
    }

    #[test]
    fn test_content_change_overwrites_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let mut scripts = ScriptMap::new();
        scripts.insert(ID_A.to_string(), script("Alpha Tool", "a();"));
        run(temp_dir.path(), &scripts);

        scripts.insert(ID_A.to_string(), script("Alpha Tool", "a2();"));
        let outcome = run(temp_dir.path(), &scripts);

        assert_eq!(outcome.counts.updated, 1);
        assert_eq!(outcome.counts.added, 0);
        assert_eq!(outcome.counts.renamed, 0);
        let on_disk = fs::read_to_string(temp_dir.path().join("alpha-tool.user.js")).unwrap();
        assert!(on_disk.contains("a2();"));
    }

    #[test]
    fn test_rename_moves_artifact_and_rebinds() {
        let temp_dir = TempDir::new().unwrap();
        let mut scripts = ScriptMap::new();
        scripts.insert(ID_A.to_string(), script("Old Name", "a();"));
        run(temp_dir.path(), &scripts);

        scripts.insert(ID_A.to_string(), script("New Name", "a();"));
        let outcome = run(temp_dir.path(), &scripts);

        assert_eq!(outcome.counts.renamed, 1);
        assert_eq!(outcome.counts.added, 0);
        assert!(!temp_dir.path().join("old-name.user.js").exists());
        assert!(temp_dir.path().join("new-name.user.js").is_file());

        let manifest = Manifest::load(temp_dir.path());
        assert_eq!(manifest.entry(ID_A).unwrap().filename, "new-name.user.js");
        assert_eq!(manifest.scripts.len(), 1);
    }

    #[test]
    fn test_rename_with_content_change_counts_once() {
        let temp_dir = TempDir::new().unwrap();
        let mut scripts = ScriptMap::new();
        scripts.insert(ID_A.to_string(), script("Old Name", "a();"));
        run(temp_dir.path(), &scripts);

        scripts.insert(ID_A.to_string(), script("New Name", "a2();"));
        let outcome = run(temp_dir.path(), &scripts);

        assert_eq!(outcome.counts.renamed, 1);
        assert_eq!(outcome.counts.updated, 0);
        let on_disk = fs::read_to_string(temp_dir.path().join("new-name.user.js")).unwrap();
        assert!(on_disk.contains("a2();"));
    }

    #[test]
    fn test_same_name_pair_gets_fragment() {
        let temp_dir = TempDir::new().unwrap();
        let mut scripts = ScriptMap::new();
        scripts.insert(ID_A.to_string(), script("Same Name", "a();"));
        scripts.insert(ID_B.to_string(), script("Same Name", "b();"));

        let outcome = run(temp_dir.path(), &scripts);
        assert_eq!(outcome.counts.added, 2);

        let filenames: Vec<&str> = outcome
            .records
            .iter()
            .map(|r| r.filename.as_str())
            .collect();
        // Identifier order puts A first; B carries the fragment
        assert!(filenames.contains(&"same-name.user.js"));
        assert!(filenames.contains(&"same-name-6ba7b810.user.js"));
        for record in &outcome.records {
            assert!(temp_dir.path().join(&record.filename).is_file());
        }
    }

    #[test]
    fn test_fragment_assignment_is_stable_across_runs() {
        let temp_dir = TempDir::new().unwrap();
        let mut scripts = ScriptMap::new();
        scripts.insert(ID_A.to_string(), script("Same Name", "a();"));
        scripts.insert(ID_B.to_string(), script("Same Name", "b();"));

        run(temp_dir.path(), &scripts);
        let second = run(temp_dir.path(), &scripts);

        assert!(!second.counts.has_changes());
        for record in &second.records {
            assert_eq!(record.status, ExportStatus::Unchanged);
        }
    }

    #[test]
    fn test_manifest_absence_means_added_even_if_file_exists() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("alpha-tool.user.js"),
            script("Alpha Tool", "a();"),
        )
        .unwrap();

        let mut scripts = ScriptMap::new();
        scripts.insert(ID_A.to_string(), script("Alpha Tool", "a();"));
        let outcome = run(temp_dir.path(), &scripts);

        assert_eq!(outcome.counts.added, 1);
        assert_eq!(outcome.records[0].status, ExportStatus::Added);
    }

    #[test]
    fn test_missing_artifact_is_readded() {
        let temp_dir = TempDir::new().unwrap();
        let mut scripts = ScriptMap::new();
        scripts.insert(ID_A.to_string(), script("Alpha Tool", "a();"));
        run(temp_dir.path(), &scripts);

        fs::remove_file(temp_dir.path().join("alpha-tool.user.js")).unwrap();
        let outcome = run(temp_dir.path(), &scripts);

        assert_eq!(outcome.counts.added, 1);
        assert!(temp_dir.path().join("alpha-tool.user.js").is_file());
    }

    #[test]
    fn test_retained_identifier_keeps_entry_and_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let mut scripts = ScriptMap::new();
        scripts.insert(ID_A.to_string(), script("Alpha Tool", "a();"));
        scripts.insert(ID_B.to_string(), script("Beta Tool", "b();"));
        run(temp_dir.path(), &scripts);

        // B disappears from the store; its export must survive
        scripts.remove(ID_B);
        scripts.insert(ID_A.to_string(), script("Alpha Tool", "a2();"));
        let outcome = run(temp_dir.path(), &scripts);

        assert_eq!(outcome.counts.removed, 0);
        assert!(temp_dir.path().join("beta-tool.user.js").is_file());
        let manifest = Manifest::load(temp_dir.path());
        assert!(manifest.entry(ID_B).is_some());
    }

    #[test]
    fn test_new_script_cannot_take_retained_filename() {
        let temp_dir = TempDir::new().unwrap();
        let mut scripts = ScriptMap::new();
        scripts.insert(ID_B.to_string(), script("Held Name", "b();"));
        run(temp_dir.path(), &scripts);

        // B vanishes; a new identifier arrives with the same display name
        let mut scripts = ScriptMap::new();
        scripts.insert(ID_A.to_string(), script("Held Name", "a();"));
        let outcome = run(temp_dir.path(), &scripts);

        assert_eq!(outcome.records[0].filename, "held-name-550e8400.user.js");
        let held = fs::read_to_string(temp_dir.path().join("held-name.user.js")).unwrap();
        assert!(held.contains("b();"));
    }

    #[test]
    fn test_no_manifest_mode_writes_no_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let mut scripts = ScriptMap::new();
        scripts.insert(ID_A.to_string(), script("Alpha Tool", "a();"));

        let mut reconciler = Reconciler::open(temp_dir.path()).unwrap();
        let outcome = reconciler.run(&scripts, false).unwrap();

        assert_eq!(outcome.counts.added, 1);
        assert!(!outcome.manifest_written);
        assert!(!temp_dir.path().join(MANIFEST_FILE).exists());
        assert!(temp_dir.path().join("alpha-tool.user.js").is_file());
    }

    #[test]
    fn test_unchanged_entry_keeps_synced_at() {
        let temp_dir = TempDir::new().unwrap();
        let mut scripts = ScriptMap::new();
        scripts.insert(ID_A.to_string(), script("Alpha Tool", "a();"));
        scripts.insert(ID_B.to_string(), script("Beta Tool", "b();"));
        run(temp_dir.path(), &scripts);

        let before = Manifest::load(temp_dir.path());
        let stamp_a = before.entry(ID_A).unwrap().synced_at.clone();

        // Only B changes; A's snapshot must not be rewritten
        scripts.insert(ID_B.to_string(), script("Beta Tool", "b2();"));
        run(temp_dir.path(), &scripts);

        let after = Manifest::load(temp_dir.path());
        assert_eq!(after.entry(ID_A).unwrap().synced_at, stamp_a);
    }
}
