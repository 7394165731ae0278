use crate::ipc::{self, Command, Handshake, Opcode, Reply};
use crate::{Activity, PresenceChannel, PresenceError};
use serde_json::{Value, json};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Byte stream to the Discord client.
pub trait IpcStream: Read + Write + Send {}

impl<T: Read + Write + Send> IpcStream for T {}

/// Presence channel backed by the Discord desktop client's IPC socket.
pub struct DiscordIpc {
    client_id: String,
    stream: Option<Box<dyn IpcStream>>,
}

impl DiscordIpc {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            stream: None,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Handshake over an already-open stream.
    pub fn connect_stream(&mut self, mut stream: Box<dyn IpcStream>) -> Result<(), PresenceError> {
        self.stream = None;

        let handshake = Handshake {
            v: 1,
            client_id: &self.client_id,
        };
        ipc::write_frame(&mut *stream, Opcode::Handshake, &handshake)?;

        let reply = read_reply(&mut *stream)?;
        if !reply.is_ready() {
            return Err(PresenceError::Connection(format!(
                "handshake refused: {}",
                reply.reason()
            )));
        }

        let user = reply
            .data
            .pointer("/user/username")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        debug!(user, "Discord IPC handshake complete");

        self.stream = Some(stream);
        Ok(())
    }

    fn send_activity(&mut self, activity: Value) -> Result<(), PresenceError> {
        let stream = self.stream.as_mut().ok_or(PresenceError::NotConnected)?;

        let command = Command {
            cmd: "SET_ACTIVITY",
            args: json!({ "pid": std::process::id(), "activity": activity }),
            nonce: uuid::Uuid::new_v4().to_string(),
        };

        let result = ipc::write_frame(&mut **stream, Opcode::Frame, &command)
            .and_then(|()| read_reply(&mut **stream));

        match result {
            Ok(reply) if reply.is_error() => Err(PresenceError::Rejected(reply.reason())),
            Ok(_) => Ok(()),
            Err(e) => {
                // The stream is unusable after a failed exchange.
                self.stream = None;
                Err(e)
            }
        }
    }
}

/// Read frames until a command reply arrives, answering pings on the way.
fn read_reply(stream: &mut dyn IpcStream) -> Result<Reply, PresenceError> {
    loop {
        let (opcode, body) = ipc::read_frame(stream)?;
        match opcode {
            Opcode::Frame => return Ok(serde_json::from_value(body)?),
            Opcode::Close => {
                let reply: Reply = serde_json::from_value(body).unwrap_or_default();
                return Err(PresenceError::Connection(format!(
                    "closed by Discord: {}",
                    reply.reason()
                )));
            }
            Opcode::Ping => ipc::write_frame(stream, Opcode::Pong, &body)?,
            Opcode::Pong | Opcode::Handshake => continue,
        }
    }
}

#[cfg(unix)]
fn open_endpoint(path: &Path) -> std::io::Result<Box<dyn IpcStream>> {
    let stream = std::os::unix::net::UnixStream::connect(path)?;
    stream.set_read_timeout(Some(IO_TIMEOUT))?;
    stream.set_write_timeout(Some(IO_TIMEOUT))?;
    Ok(Box::new(stream))
}

#[cfg(windows)]
fn open_endpoint(path: &Path) -> std::io::Result<Box<dyn IpcStream>> {
    let pipe = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)?;
    Ok(Box::new(pipe))
}

impl PresenceChannel for DiscordIpc {
    fn connect(&mut self) -> Result<(), PresenceError> {
        let mut last_error = None;

        for path in ipc::candidate_paths() {
            let stream = match open_endpoint(&path) {
                Ok(stream) => stream,
                Err(_) => continue,
            };

            match self.connect_stream(stream) {
                Ok(()) => {
                    debug!(path = %path.display(), "connected to Discord IPC");
                    return Ok(());
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Discord IPC endpoint refused handshake");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            PresenceError::Connection("no discord-ipc endpoint found; is Discord running?".to_string())
        }))
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn update(&mut self, activity: &Activity) -> Result<(), PresenceError> {
        self.send_activity(activity.to_json())
    }

    fn clear(&mut self) -> Result<(), PresenceError> {
        self.send_activity(Value::Null)
    }
}

impl Drop for DiscordIpc {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = ipc::write_frame(&mut *stream, Opcode::Close, &json!({}));
        }
    }
}
