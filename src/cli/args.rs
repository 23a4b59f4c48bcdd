//! CLI argument definitions using clap
//!
//! Invocations:
//! - tweeks-sync                          full sync to the default output
//! - tweeks-sync -o <dir>                 sync to an explicit output
//! - tweeks-sync -d <dir>                 also mirror into a destination
//! - tweeks-sync --list                   show recoverable scripts only

use clap::Parser;
use std::path::PathBuf;

/// Sync userscripts from the Tweeks by NextByte Chrome extension
#[derive(Parser, Debug)]
#[command(name = "tweeks-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output directory for userscripts (default: ~/Developer/tweeks-userscripts)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Destination directory to copy scripts to with a 'tweeks.' prefix
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Don't create or update manifest.json
    #[arg(long)]
    pub no_manifest: bool,

    /// List found userscripts without exporting
    #[arg(long)]
    pub list: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// The effective output directory. `None` only when no home directory
    /// can be resolved for the default.
    pub fn output_dir(&self) -> Option<PathBuf> {
        self.output.clone().or_else(default_output_dir)
    }
}

/// Default export location under the user's home.
pub fn default_output_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("Developer").join("tweeks-userscripts"))
}
