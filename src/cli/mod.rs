//! CLI module for tweeks-sync
//!
//! Provides the command-line surface:
//! - default run: recover, reconcile, commit, mirror
//! - --list: show recoverable scripts without exporting
//! - -o/--output, -d/--dest, --no-manifest

mod args;
mod commands;
mod errors;
mod prompt;

pub use args::{default_output_dir, Cli};
pub use commands::run;
pub use errors::{CliError, CliResult};
