//! Export reconciliation
//!
//! Takes the merged recovery result and makes the output directory agree
//! with it: one `<slug>.user.js` artifact per script, a manifest binding
//! identifiers to filenames across runs, and a per-record status telling
//! what changed. Retention is absolute here; reconciliation adds, updates,
//! and renames, but never deletes an export.

mod errors;
mod manifest;
mod reconciler;
mod slug;

pub use errors::{ExportError, ExportResult};
pub use manifest::{Manifest, ManifestEntry, MANIFEST_FILE};
pub use reconciler::{
    ExportOutcome, ExportRecord, ExportStatus, Reconciler, SyncCounts, SCRIPT_SUFFIX,
};
pub use slug::slugify;
