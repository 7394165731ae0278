use chrono::{DateTime, Utc};
use daw_project::{ProjectName, StatusPayload};
use std::time::SystemTime;

/// Everything the monitor remembers between ticks. Never persisted.
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub is_app_running: bool,
    /// Elapsed-time anchor shown by the presence channel.
    pub session_start: DateTime<Utc>,
    pub last_modified: Option<SystemTime>,
    pub last_payload: Option<StatusPayload>,
    pub channel_connected: bool,
    /// Broadcast flag value seen on the previous tick.
    pub broadcasting_seen: bool,
    /// Project the anchor was last reset for, when timing per project.
    pub anchored_project: Option<ProjectName>,
    pub connect_failures: u32,
    /// The startup liveness check hasn't succeeded yet.
    pub startup_pending: bool,
    /// A clear was requested but not yet accepted by the channel.
    pub clear_pending: bool,
}

impl MonitorState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            is_app_running: false,
            session_start: now,
            last_modified: None,
            last_payload: None,
            channel_connected: false,
            broadcasting_seen: true,
            anchored_project: None,
            connect_failures: 0,
            startup_pending: true,
            clear_pending: false,
        }
    }

    /// Drop the remembered status so the next read is pushed again.
    pub fn forget_payload(&mut self) {
        self.last_modified = None;
        self.last_payload = None;
    }

    pub fn app_launched(&mut self, now: DateTime<Utc>) {
        self.is_app_running = true;
        self.session_start = now;
        self.anchored_project = None;
        self.forget_payload();
    }

    pub fn app_closed(&mut self) {
        self.is_app_running = false;
        self.anchored_project = None;
        self.forget_payload();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_new_state_is_not_running() {
        let state = MonitorState::new(Utc::now());
        assert!(!state.is_app_running);
        assert!(!state.channel_connected);
        assert!(state.last_payload.is_none());
        assert!(state.last_modified.is_none());
        assert!(state.startup_pending);
        assert!(!state.clear_pending);
    }

    #[test]
    fn test_launch_resets_clock_and_payload() {
        let start = Utc::now();
        let mut state = MonitorState::new(start);
        state.last_payload = Some(StatusPayload::named("Old"));
        state.last_modified = Some(SystemTime::now());

        let later = start + TimeDelta::seconds(30);
        state.app_launched(later);

        assert!(state.is_app_running);
        assert_eq!(state.session_start, later);
        assert!(state.last_payload.is_none());
        assert!(state.last_modified.is_none());
        assert!(state.startup_pending);
        assert!(!state.clear_pending);
    }

    #[test]
    fn test_close_forgets_payload() {
        let mut state = MonitorState::new(Utc::now());
        state.app_launched(Utc::now());
        state.last_payload = Some(StatusPayload::named("Song"));

        state.app_closed();

        assert!(!state.is_app_running);
        assert!(state.last_payload.is_none());
    }
}
