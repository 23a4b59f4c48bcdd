//! Interactive stdin/stdout handling for the CLI.
//!
//! Two conversations happen here: the one-time destination question whose
//! answer is persisted, and the pre-sync check that Chrome is closed. Both
//! read plain lines from stdin; there is no terminal UI dependency.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::browser::process;
use crate::config::ToolConfig;

/// Reads one trimmed line from stdin.
fn read_line() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn ask(question: &str) -> io::Result<String> {
    print!("{}", question);
    io::stdout().flush()?;
    read_line()
}

/// Expands a leading `~/` against the user's home.
fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Resolves the destination directory from the flag, the saved config, or
/// a first-run prompt, in that order. Whatever is decided (including an
/// empty answer, meaning "no destination") is persisted so the question is
/// asked at most once.
pub fn resolve_destination(flag: Option<PathBuf>) -> io::Result<Option<PathBuf>> {
    let mut config = ToolConfig::load();

    if let Some(dest) = flag {
        config.set_destination(Some(dest.clone()));
        config.store()?;
        return Ok(Some(dest));
    }

    if let Some(choice) = config.destination_choice() {
        return Ok(choice.map(Path::to_path_buf));
    }

    println!();
    println!("Optional: set a destination directory to copy userscripts to.");
    println!("Scripts will be copied with a 'tweeks.' prefix (e.g., tweeks.script-name.user.js)");
    println!("Press Enter to skip, or enter a path:");

    let answer = ask("Destination directory: ")?;
    if answer.is_empty() {
        config.set_destination(None);
        config.store()?;
        return Ok(None);
    }

    let dest = expand_home(&answer);
    config.set_destination(Some(dest.clone()));
    config.store()?;
    println!("Saved destination: {}", dest.display());
    Ok(Some(dest))
}

/// Makes sure Chrome is not running before the store is read.
///
/// Offers to quit it gracefully, lets the user do it by hand, or accepts a
/// refusal. Returns false when Chrome is still up at the end.
pub fn ensure_browser_closed() -> io::Result<bool> {
    if !process::is_running() {
        return Ok(true);
    }

    println!("Google Chrome is running.");
    println!("Chrome must be closed to read the userscript database.");
    println!();

    loop {
        let answer = ask("Quit Chrome now? [Y/n/manual]: ")?.to_lowercase();
        match answer.as_str() {
            "" | "y" | "yes" => {
                println!("Quitting Chrome...");
                if !process::request_quit() {
                    println!("Could not deliver the quit request. Please close Chrome manually.");
                    return Ok(false);
                }
                if process::wait_for_exit() {
                    println!("Chrome closed.");
                    return Ok(true);
                }
                println!("Chrome is still running. Please close it manually and retry.");
                return Ok(false);
            }
            "n" | "no" => {
                return Ok(false);
            }
            "manual" => {
                ask("Close Chrome manually, then press Enter... ")?;
                if !process::is_running() {
                    return Ok(true);
                }
                println!("Chrome is still running.");
            }
            _ => println!("Please answer 'y' (quit Chrome), 'n' (cancel), or 'manual'."),
        }
    }
}
