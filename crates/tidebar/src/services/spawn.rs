//! Fire-and-forget command execution for widget click handlers.
//!
//! Commands come from user config ("command" options) and run through
//! `sh -c` so pipes and arguments work as they would in a terminal. The
//! child is reaped on a detached thread so it never becomes a zombie.

use std::process::Command;
use std::thread;

use tracing::{debug, warn};

/// Spawn a shell command without waiting for it.
///
/// Failures to launch are logged, not propagated; a broken click command
/// should never take the bar down.
pub fn spawn_command(command: &str) {
    let command = command.trim();
    if command.is_empty() {
        return;
    }

    debug!("Spawning command: {}", command);
    match Command::new("sh").arg("-c").arg(command).spawn() {
        Ok(mut child) => {
            thread::spawn(move || {
                let _ = child.wait();
            });
        }
        Err(err) => {
            warn!("Failed to spawn '{}': {}", command, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_is_noop() {
        spawn_command("");
        spawn_command("   ");
    }

    #[test]
    fn test_spawn_true_succeeds() {
        spawn_command("true");
    }
}
