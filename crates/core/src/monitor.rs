//! The per-tick state machine that keeps the presence channel in step with
//! the DAW.
//!
//! | State      | Trigger                           | Next       | Side effect             |
//! |------------|-----------------------------------|------------|-------------------------|
//! | NotRunning | app detected                      | Running    | reset clock, reset file |
//! | Running    | app vanished                      | NotRunning | clear channel, cooldown |
//! | Running    | file unchanged                    | Running    | none                    |
//! | Running    | file changed, same payload        | Running    | none                    |
//! | Running    | file changed, different payload   | Running    | push update             |
//! | any        | clear pending                     | same       | retry clear first       |

use crate::config::{MonitorConfig, Timing};
use crate::display::build_activity;
use crate::process::{ProbeError, ProcessProbe};
use crate::state::MonitorState;
use chrono::Utc;
use daw_presence::{PresenceChannel, PresenceError};
use daw_project::{StatusError, StatusPayload, StatusProblem, load_status, reset_status, status_modified};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("presence channel: {0}")]
    Presence(#[from] PresenceError),

    #[error("process probe: {0}")]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Status(#[from] StatusError),
}

/// What a completed tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickEvent {
    /// The application isn't running and wasn't before.
    AppIdle,
    /// The application just exited; the channel was cleared.
    AppClosed,
    /// No usable status file yet.
    NoData,
    ArtifactUnchanged,
    PayloadUnchanged,
    PresenceUpdated(StatusPayload),
    /// Payload changed but broadcasting is switched off.
    UpdateSuppressed(StatusPayload),
}

/// Classified result of one tick.
#[derive(Debug)]
pub enum TickOutcome {
    Ok(TickEvent),
    /// An external call failed; the next tick retries.
    TransientIo(MonitorError),
    /// The status text was partly unusable and defaults were applied.
    MalformedData {
        event: TickEvent,
        problems: Vec<StatusProblem>,
    },
}

impl TickOutcome {
    pub fn event(&self) -> Option<&TickEvent> {
        match self {
            TickOutcome::Ok(event) | TickOutcome::MalformedData { event, .. } => Some(event),
            TickOutcome::TransientIo(_) => None,
        }
    }

    /// How long to sleep before the next tick.
    pub fn delay(&self, timing: &Timing) -> Duration {
        match self {
            TickOutcome::Ok(TickEvent::AppClosed) => timing.cooldown,
            TickOutcome::TransientIo(_) => timing.retry_backoff,
            _ => timing.poll_interval,
        }
    }
}

pub struct Monitor<C, P> {
    config: MonitorConfig,
    channel: C,
    probe: P,
    state: MonitorState,
    broadcasting: Arc<AtomicBool>,
}

impl<C: PresenceChannel, P: ProcessProbe> Monitor<C, P> {
    pub fn new(config: MonitorConfig, channel: C, probe: P, broadcasting: Arc<AtomicBool>) -> Self {
        let mut state = MonitorState::new(Utc::now());
        state.broadcasting_seen = broadcasting.load(Ordering::SeqCst);

        Self {
            config,
            channel,
            probe,
            state,
            broadcasting,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Check liveness once before the loop starts.
    ///
    /// A status file written by an already-running DAW is left alone; it is
    /// only reset when the DAW is known to be closed. If the check fails, the
    /// first successful probe in `tick` is treated as this startup check.
    pub fn start(&mut self) {
        match self.probe.is_running(&self.config.matcher) {
            Ok(running) => self.observe_startup(running),
            Err(e) => {
                warn!(error = %e, "initial process check failed, deferring to first tick");
            }
        }
    }

    fn observe_startup(&mut self, running: bool) {
        self.state.startup_pending = false;
        if running {
            info!("Ableton Live is already running, keeping status file");
            self.state.app_launched(Utc::now());
        } else {
            info!("Ableton Live is not running");
            if self.config.clear_on_launch {
                self.reset_status_file();
            }
        }
    }

    pub async fn tick(&mut self) -> TickOutcome {
        if let Err(e) = self.ensure_connected() {
            return TickOutcome::TransientIo(e);
        }

        self.sync_broadcast_flag();

        if self.state.clear_pending {
            if let Err(e) = self.clear_channel() {
                return TickOutcome::TransientIo(e.into());
            }
        }

        let running = match self.probe.is_running(&self.config.matcher) {
            Ok(running) => running,
            Err(e) => {
                debug!(error = %e, "process check failed");
                return TickOutcome::TransientIo(e.into());
            }
        };

        if self.state.startup_pending {
            self.observe_startup(running);
        }

        match (self.state.is_app_running, running) {
            (false, false) => return TickOutcome::Ok(TickEvent::AppIdle),
            (true, false) => return self.on_app_closed(),
            (false, true) => self.on_app_launched(),
            (true, true) => {}
        }

        self.poll_status_file().await
    }

    /// Clear the channel on the way out.
    pub fn shutdown(&mut self) {
        if self.channel.is_connected() {
            if let Err(e) = self.channel.clear() {
                debug!(error = %e, "failed to clear presence on shutdown");
            }
        }
    }

    fn ensure_connected(&mut self) -> Result<(), MonitorError> {
        self.state.channel_connected = self.channel.is_connected();
        if self.state.channel_connected {
            return Ok(());
        }

        match self.channel.connect() {
            Ok(()) => {
                info!("connected to presence channel");
                self.state.channel_connected = true;
                self.state.connect_failures = 0;
                // A fresh connection shows nothing; push the current status again.
                self.state.forget_payload();
                self.state.clear_pending = false;
                Ok(())
            }
            Err(e) => {
                self.state.connect_failures += 1;
                if self.state.connect_failures == 1 {
                    warn!(error = %e, "presence channel unavailable, will keep retrying");
                } else {
                    debug!(error = %e, attempt = self.state.connect_failures, "presence connect failed");
                }
                Err(e.into())
            }
        }
    }

    fn sync_broadcast_flag(&mut self) {
        let enabled = self.broadcasting.load(Ordering::SeqCst);
        if enabled == self.state.broadcasting_seen {
            return;
        }
        self.state.broadcasting_seen = enabled;

        if enabled {
            info!("rich presence enabled");
            self.state.forget_payload();
        } else {
            info!("rich presence disabled");
            self.state.clear_pending = true;
        }
    }

    /// Clear the channel. On failure the clear stays pending and is retried
    /// at the start of the next tick.
    fn clear_channel(&mut self) -> Result<(), PresenceError> {
        self.state.clear_pending = true;
        match self.channel.clear() {
            Ok(()) => {
                self.state.clear_pending = false;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to clear presence");
                self.state.channel_connected = self.channel.is_connected();
                Err(e)
            }
        }
    }

    fn on_app_launched(&mut self) {
        info!("Ableton Live launch detected");
        self.state.app_launched(Utc::now());
        if self.config.clear_on_launch {
            self.reset_status_file();
        }
    }

    fn on_app_closed(&mut self) -> TickOutcome {
        info!("Ableton Live closed");
        self.state.app_closed();

        match self.clear_channel() {
            Ok(()) => TickOutcome::Ok(TickEvent::AppClosed),
            Err(e) => TickOutcome::TransientIo(e.into()),
        }
    }

    fn reset_status_file(&self) {
        match reset_status(&self.config.status_file) {
            Ok(()) => debug!(path = %self.config.status_file.display(), "status file reset"),
            Err(e) if e.is_not_found() => {
                debug!(error = %e, "status file directory missing, nothing to reset");
            }
            Err(e) => warn!(error = %e, "failed to reset status file"),
        }
    }

    async fn poll_status_file(&mut self) -> TickOutcome {
        let path = self.config.status_file.clone();

        let modified = match status_modified(&path) {
            Ok(modified) => modified,
            Err(e) if e.is_not_found() => return TickOutcome::Ok(TickEvent::NoData),
            Err(e) => return TickOutcome::TransientIo(e.into()),
        };
        if self.state.last_modified == Some(modified) {
            return TickOutcome::Ok(TickEvent::ArtifactUnchanged);
        }

        // The producer may still be writing.
        tokio::time::sleep(self.config.timing.debounce).await;

        let parsed = match load_status(&path) {
            Ok(parsed) => parsed,
            Err(e) if e.is_not_found() => return TickOutcome::Ok(TickEvent::NoData),
            Err(e) => return TickOutcome::TransientIo(e.into()),
        };
        self.state.last_modified = Some(modified);
        debug!(project = %parsed.payload.project, "read status file");

        if let Some(installation) = self.config.matcher.installation() {
            if !parsed.payload.is_from_installation(installation) {
                debug!(
                    reported = ?parsed.payload.installation,
                    "status file written by another installation, ignoring"
                );
                return TickOutcome::Ok(TickEvent::NoData);
            }
        }

        let event = match self.apply_payload(parsed.payload) {
            Ok(event) => event,
            Err(e) => return TickOutcome::TransientIo(e),
        };

        if parsed.problems.is_empty() {
            TickOutcome::Ok(event)
        } else {
            for problem in &parsed.problems {
                warn!(%problem, "status file content");
            }
            TickOutcome::MalformedData {
                event,
                problems: parsed.problems,
            }
        }
    }

    fn apply_payload(&mut self, payload: StatusPayload) -> Result<TickEvent, MonitorError> {
        if self.state.last_payload.as_ref() == Some(&payload) {
            return Ok(TickEvent::PayloadUnchanged);
        }

        if self.config.restart_timer_per_project
            && payload.project.is_open()
            && self.state.anchored_project.as_ref() != Some(&payload.project)
        {
            self.state.session_start = Utc::now();
            self.state.anchored_project = Some(payload.project.clone());
        }

        if !self.broadcasting.load(Ordering::SeqCst) {
            debug!(project = %payload.project, "broadcasting disabled, not updating presence");
            self.state.last_payload = Some(payload.clone());
            return Ok(TickEvent::UpdateSuppressed(payload));
        }

        let activity = build_activity(&payload, self.state.session_start, &self.config.style);
        match self.channel.update(&activity) {
            Ok(()) => {
                info!(project = %payload.project, state = %activity.state, "presence updated");
                self.state.last_payload = Some(payload.clone());
                Ok(TickEvent::PresenceUpdated(payload))
            }
            Err(e) => {
                warn!(error = %e, "presence update failed");
                self.state.channel_connected = self.channel.is_connected();
                // Re-read and retry on the next tick.
                self.state.last_modified = None;
                Err(e.into())
            }
        }
    }
}
