//! Interactive `toggle` command read from stdin.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleCommand {
    Toggle,
    On,
    Off,
}

impl ToggleCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "toggle" => Some(ToggleCommand::Toggle),
            "on" | "enable" => Some(ToggleCommand::On),
            "off" | "disable" => Some(ToggleCommand::Off),
            _ => None,
        }
    }

    /// Apply to the broadcast flag and return its new value.
    pub fn apply(self, flag: &AtomicBool) -> bool {
        match self {
            ToggleCommand::Toggle => !flag.fetch_xor(true, Ordering::SeqCst),
            ToggleCommand::On => {
                flag.store(true, Ordering::SeqCst);
                true
            }
            ToggleCommand::Off => {
                flag.store(false, Ordering::SeqCst);
                false
            }
        }
    }
}

fn listen<R: BufRead>(input: R, flag: &AtomicBool) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "stdin read failed, toggle listener stopping");
                return;
            }
        };

        match ToggleCommand::parse(&line) {
            Some(command) => {
                let enabled = command.apply(flag);
                info!(
                    "Rich Presence {}",
                    if enabled { "enabled" } else { "disabled" }
                );
            }
            None if line.trim().is_empty() => {}
            None => info!(input = line.trim(), "unknown command, try 'toggle', 'on' or 'off'"),
        }
    }
    debug!("stdin closed, toggle listener stopping");
}

/// Read commands from stdin on a background thread.
///
/// The thread is never joined; it ends with the process.
pub fn spawn_stdin_listener(flag: Arc<AtomicBool>) -> io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("stdin-toggle".to_string())
        .spawn(move || listen(io::stdin().lock(), &flag))
}
