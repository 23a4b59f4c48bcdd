//! Git collaborator for the output directory.
//!
//! Every sync ends in a commit so the repository's history is the change
//! log of the user's scripts. Version control failures never abort a sync;
//! the exports on disk are the product, the commit is bookkeeping.

use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::export::SyncCounts;

const GITIGNORE: &str = ".DS_Store\n";

const README: &str = "\
# Tweeks Userscripts

Userscripts exported from the Tweeks by NextByte Chrome extension.

Managed by `tweeks-sync`; edit scripts in the extension, not here.
";

/// Initializes a git repository in the output directory if one is absent.
///
/// A fresh repository gets a `.gitignore` and a README scaffold so the
/// first commit is self-describing. Returns true when this call created
/// the repository.
pub fn init_repo(output_dir: &Path) -> io::Result<bool> {
    fs::create_dir_all(output_dir)?;
    if output_dir.join(".git").exists() {
        return Ok(false);
    }

    if !run_git(output_dir, &["init"])? {
        println!("Warning: could not initialize git repository.");
        return Ok(false);
    }

    let gitignore = output_dir.join(".gitignore");
    if !gitignore.exists() {
        fs::write(&gitignore, GITIGNORE)?;
    }
    let readme = output_dir.join("README.md");
    if !readme.exists() {
        fs::write(&readme, README)?;
    }

    println!("Initialized git repository in {}", output_dir.display());
    Ok(true)
}

/// Stages everything and commits with the run's summary as the message.
///
/// "Nothing to commit" is tolerated quietly: the tree can already be clean
/// when a prior run committed the same state.
pub fn commit(output_dir: &Path, counts: &SyncCounts, first_sync: bool) -> io::Result<()> {
    if !first_sync && !counts.has_changes() {
        println!("No script changes to commit.");
        return Ok(());
    }

    run_git(output_dir, &["add", "-A"])?;

    let message = counts.to_string();
    let output = Command::new("git")
        .args(["commit", "-m", &message])
        .current_dir(output_dir)
        .output()?;

    if output.status.success() {
        println!("Committed: {}", message);
        return Ok(());
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_lowercase();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stdout.contains("nothing to commit") || stderr.to_lowercase().contains("nothing to commit") {
        println!("No changes to commit.");
    } else {
        println!("Warning: commit failed: {}", stderr.trim());
    }
    Ok(())
}

fn run_git(dir: &Path, args: &[&str]) -> io::Result<bool> {
    let output = Command::new("git").args(args).current_dir(dir).output()?;
    if !output.status.success() {
        debug!("git {:?} exited with {}", args, output.status);
    }
    Ok(output.status.success())
}
