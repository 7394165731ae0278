//! Keeps a rich presence status in step with a running Ableton Live session.

pub mod config;
pub mod display;
pub mod monitor;
pub mod poll;
pub mod process;
pub mod state;

pub use config::{MonitorConfig, Timing};
pub use display::{ActivityStyle, build_activity, status_line};
pub use monitor::{Monitor, MonitorError, TickEvent, TickOutcome};
pub use poll::run_monitor;
pub use process::{AppMatcher, ProbeError, ProcessInfo, ProcessProbe, SysinfoProbe};
pub use state::MonitorState;

pub use daw_presence::{Activity, DiscordIpc, PresenceChannel, PresenceError};
pub use daw_project::{ProjectName, StatusFormat, StatusPayload, StatusProblem};
pub use daw_transport::TransportState;
