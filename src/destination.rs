//! Secondary copy of exported scripts.
//!
//! Some userscript managers watch a single directory for `*.user.js` files.
//! When a destination is configured, every export is mirrored there under a
//! `tweeks.` prefix so synced files are recognizable next to hand-written
//! ones and never clobber them.

use std::fs;
use std::io;
use std::path::Path;

use crate::export::SCRIPT_SUFFIX;

/// Prefix carried by every mirrored filename
const COPY_PREFIX: &str = "tweeks.";

/// Per-file accounting for one mirror pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub added: usize,
    pub skipped: usize,
    pub overwritten: usize,
}

impl std::fmt::Display for CopyStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} added; {} skipped; {} overwritten",
            self.added, self.skipped, self.overwritten
        )
    }
}

/// Copies every exported script into `dest_dir` under the mirror prefix.
///
/// Byte-identical existing copies are left alone so watchers do not see
/// spurious modification events. Only `*.user.js` files are mirrored; the
/// manifest and repository files stay behind.
pub fn copy_exports(output_dir: &Path, dest_dir: &Path) -> io::Result<CopyStats> {
    fs::create_dir_all(dest_dir)?;

    let mut sources: Vec<_> = fs::read_dir(output_dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(SCRIPT_SUFFIX))
        })
        .collect();
    sources.sort();

    let mut stats = CopyStats::default();
    for source in sources {
        let Some(name) = source.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let target = dest_dir.join(format!("{}{}", COPY_PREFIX, name));

        if target.is_file() {
            if fs::read(&source)? == fs::read(&target)? {
                stats.skipped += 1;
                continue;
            }
            fs::copy(&source, &target)?;
            stats.overwritten += 1;
        } else {
            fs::copy(&source, &target)?;
            stats.added += 1;
        }
    }

    Ok(stats)
}
