//! Browser process control.
//!
//! The structured read path needs the store lock, and Chrome holds it for
//! as long as it runs. These helpers detect a running browser and ask it
//! to quit the way a user would, via AppleScript, so Chrome gets to flush
//! and release the store cleanly instead of being killed under it.

use std::process::Command;
use std::thread;
use std::time::Duration;

use tracing::debug;

/// Name Chrome runs under in the process table
const PROCESS_NAME: &str = "Google Chrome";

/// Poll interval while waiting for Chrome to exit
const EXIT_POLL: Duration = Duration::from_millis(500);

/// Number of polls before giving up on a graceful exit
const EXIT_POLLS: u32 = 10;

/// Whether Chrome is currently running.
pub fn is_running() -> bool {
    Command::new("pgrep")
        .args(["-x", PROCESS_NAME])
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Asks Chrome to quit gracefully. Returns false when the request itself
/// could not be delivered; a true result only means Chrome accepted it.
pub fn request_quit() -> bool {
    let delivered = Command::new("osascript")
        .args(["-e", r#"tell application "Google Chrome" to quit"#])
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);
    debug!("quit request delivered: {}", delivered);
    delivered
}

/// Waits up to five seconds for Chrome to exit after a quit request.
pub fn wait_for_exit() -> bool {
    for _ in 0..EXIT_POLLS {
        thread::sleep(EXIT_POLL);
        if !is_running() {
            return true;
        }
    }
    false
}
