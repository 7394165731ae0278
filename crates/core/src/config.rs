use crate::display::ActivityStyle;
use crate::process::AppMatcher;
use std::path::PathBuf;
use std::time::Duration;

/// Sleep lengths used by the monitor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Between ordinary ticks.
    pub poll_interval: Duration,
    /// After the application closes.
    pub cooldown: Duration,
    /// Between seeing a new mtime and reading the file.
    pub debounce: Duration,
    /// After an external call failed.
    pub retry_backoff: Duration,
    /// After a tick panicked.
    pub panic_backoff: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            cooldown: Duration::from_secs(5),
            debounce: Duration::from_millis(500),
            retry_backoff: Duration::from_secs(5),
            panic_backoff: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub status_file: PathBuf,
    pub matcher: AppMatcher,
    pub timing: Timing,
    /// Reset the status file when the application starts.
    pub clear_on_launch: bool,
    /// Restart the elapsed timer whenever a different project opens.
    pub restart_timer_per_project: bool,
    pub style: ActivityStyle,
}

impl MonitorConfig {
    pub fn new(status_file: impl Into<PathBuf>) -> Self {
        Self {
            status_file: status_file.into(),
            matcher: AppMatcher::default(),
            timing: Timing::default(),
            clear_on_launch: true,
            restart_timer_per_project: false,
            style: ActivityStyle::default(),
        }
    }
}
