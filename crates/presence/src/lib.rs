//! Rich presence channel.
//!
//! `PresenceChannel` is the narrow interface the monitor drives. `DiscordIpc`
//! implements it against the Discord desktop client's local IPC socket.

mod activity;
mod client;
pub mod ipc;

pub use activity::Activity;
pub use client::{DiscordIpc, IpcStream};

/// A connection to a presence service.
///
/// Every operation may fail; callers treat failures as transient.
pub trait PresenceChannel: Send {
    fn connect(&mut self) -> Result<(), PresenceError>;

    fn is_connected(&self) -> bool;

    /// Replace the displayed activity.
    fn update(&mut self, activity: &Activity) -> Result<(), PresenceError>;

    /// Remove the displayed activity.
    fn clear(&mut self) -> Result<(), PresenceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("Discord client is not reachable: {0}")]
    Connection(String),

    #[error("presence channel is not connected")]
    NotConnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IPC protocol error: {0}")]
    Protocol(String),

    #[error("Discord rejected the request: {0}")]
    Rejected(String),
}
