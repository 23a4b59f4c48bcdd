//! CLI command implementations
//!
//! Two runs exist: `--list` scans and prints what is recoverable without
//! touching anything, and the default run does the full pipeline of
//! recover, reconcile, commit, and optional mirror copy.

use std::path::Path;

use tracing::info;

use crate::browser::{self, ProfileStore};
use crate::destination;
use crate::export::{ExportStatus, Reconciler};
use crate::script;
use crate::store::{self, ScriptMap};
use crate::vcs;

use super::args::Cli;
use super::errors::{CliError, CliResult};
use super::prompt;

/// Entry point: parses arguments and dispatches.
pub fn run() -> CliResult<()> {
    let args = Cli::parse_args();

    if args.list {
        return list();
    }

    let output_dir = args
        .output_dir()
        .ok_or_else(|| CliError::Config("cannot determine home directory".to_string()))?;
    let dest_dir = prompt::resolve_destination(args.dest.clone())?;

    sync(&output_dir, !args.no_manifest, dest_dir.as_deref())
}

/// Prints recoverable scripts per profile without exporting anything.
fn list() -> CliResult<()> {
    let stores = discover_stores()?;
    if stores.is_empty() {
        println!("No Tweeks extensions found.");
        return Ok(());
    }

    for entry in &stores {
        println!();
        println!("{}:", entry.profile);
        let recovery = store::recover_store(&entry.store_dir);
        if recovery.scripts.is_empty() {
            println!("  (no userscripts found)");
            continue;
        }
        for (uuid, content) in &recovery.scripts {
            let metadata = script::parse_metadata(content);
            println!("  - {}", script::display_name(&metadata, uuid));
        }
    }
    Ok(())
}

/// Full sync: recover from every profile, reconcile, commit, mirror.
fn sync(output_dir: &Path, write_manifest: bool, dest_dir: Option<&Path>) -> CliResult<()> {
    if !prompt::ensure_browser_closed()? {
        return Err(CliError::BrowserRunning);
    }

    let stores = discover_stores()?;
    if stores.is_empty() {
        println!("No Tweeks extensions found.");
        return Ok(());
    }

    let mut scripts = ScriptMap::new();
    let mut locked = false;

    for entry in &stores {
        if !browser::verify_extension(&entry.profile_dir) {
            println!(
                "Warning: could not verify the Tweeks extension in {}; skipping it.",
                entry.profile
            );
            continue;
        }
        println!("Extracting scripts from {}...", entry.profile);
        let recovery = store::recover_store(&entry.store_dir);
        locked |= recovery.locked;
        // Later profiles win on identifier collisions; profile order is
        // fixed by discovery, so the winner is stable across runs.
        scripts.extend(recovery.scripts);
    }

    if scripts.is_empty() {
        if locked {
            return Err(CliError::StoreLocked);
        }
        println!("No userscripts found.");
        return Ok(());
    }

    println!();
    println!("Found {} userscript(s)", scripts.len());
    println!("Exporting to {}...", output_dir.display());

    let first_sync = vcs::init_repo(output_dir)?;

    let mut reconciler = Reconciler::open(output_dir)?;
    let outcome = reconciler.run(&scripts, write_manifest)?;

    for record in &outcome.records {
        match record.status {
            ExportStatus::Added => println!("  Added: {}", record.filename),
            ExportStatus::Updated => println!("  Updated: {}", record.filename),
            ExportStatus::Renamed => println!("  Renamed: {}", record.filename),
            ExportStatus::Unchanged => println!("  Unchanged: {}", record.filename),
        }
    }
    if outcome.manifest_written {
        println!("  Updated manifest.json");
    }

    vcs::commit(output_dir, &outcome.counts, first_sync)?;

    if let Some(dest) = dest_dir {
        let stats = destination::copy_exports(output_dir, dest)?;
        println!("Destination: {}", stats);
    }

    info!("sync finished: {}", outcome.counts);
    println!();
    println!("Sync complete. {} script(s) processed.", outcome.records.len());
    Ok(())
}

/// Locates every profile store, announcing each find.
fn discover_stores() -> CliResult<Vec<ProfileStore>> {
    let support_dir = browser::chrome_support_dir()
        .ok_or_else(|| CliError::Config("cannot determine home directory".to_string()))?;

    println!("Scanning for Tweeks extensions...");
    if !support_dir.is_dir() {
        println!("Chrome support directory not found: {}", support_dir.display());
        return Ok(Vec::new());
    }

    let stores = browser::discover(&support_dir);
    for entry in &stores {
        println!("Found Tweeks database in: {}", entry.profile);
    }
    Ok(stores)
}
