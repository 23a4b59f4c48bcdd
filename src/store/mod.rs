//! Extension store recovery
//!
//! Recovers userscript records from a Chrome extension's LevelDB store,
//! which may be healthy, locked by a running browser, or damaged. Two
//! sources implement the read:
//!
//! - Structured: open the store as a database and iterate live pairs
//! - Raw: scan log and table segment files as bytes for serialized records
//!
//! `recover_store` prefers structured and falls back to raw, merging by
//! identifier. Extraction faults never abort a run; the only condition the
//! caller must act on is a held lock with zero recoverable records.

mod errors;
mod raw;
mod segments;
mod source;
mod structured;

pub use errors::{StoreError, StoreResult};
pub use raw::{decode_escapes, extract_scripts, SCRIPT_MARKER};
pub use segments::{list_segments, Segment, SegmentKind};
pub use source::{recover_store, RawSegmentSource, ScriptMap, ScriptSource, StoreRecovery};
pub use structured::StructuredSource;
