//! Segment file discovery for an extension store directory.
//!
//! A LevelDB store persists data in two kinds of segment file: append-only
//! write-ahead logs (`*.log`) and compacted sorted tables (`*.ldb`). Recent
//! writes live in the logs; tables hold the compacted history. The raw
//! fallback scan reads both kinds as plain bytes, so discovery only needs
//! to classify and order them.

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::StoreResult;

/// Kind of physical segment file backing the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Append-only write-ahead log (`*.log`)
    Log,
    /// Compacted sorted table (`*.ldb`)
    Table,
}

/// One physical segment file of a store
#[derive(Debug, Clone)]
pub struct Segment {
    pub path: PathBuf,
    pub kind: SegmentKind,
}

impl Segment {
    /// Reads the whole segment and decodes it as text.
    ///
    /// Segments are binary files with string data embedded in them, so
    /// invalid UTF-8 sequences are replaced rather than rejected. Record
    /// extraction only keys on ASCII delimiters and is unaffected by the
    /// replacement characters.
    pub fn read_text(&self) -> StoreResult<String> {
        let bytes = fs::read(&self.path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Lists the segment files of a store directory, logs before tables.
///
/// Within each kind, segments are sorted by path so repeated scans of the
/// same directory visit files in the same order.
pub fn list_segments(dir: &Path) -> StoreResult<Vec<Segment>> {
    let mut logs = Vec::new();
    let mut tables = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("log") => logs.push(Segment {
                path,
                kind: SegmentKind::Log,
            }),
            Some("ldb") => tables.push(Segment {
                path,
                kind: SegmentKind::Table,
            }),
            _ => {}
        }
    }

    logs.sort_by(|a, b| a.path.cmp(&b.path));
    tables.sort_by(|a, b| a.path.cmp(&b.path));

    logs.extend(tables);
    Ok(logs)
}
