//! Framing for the Discord local IPC protocol.
//!
//! Each frame is a little-endian `u32` opcode, a little-endian `u32` length
//! and that many bytes of JSON.

use crate::PresenceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{Read, Write};
use std::path::PathBuf;

/// Upper bound on an incoming frame body.
const MAX_FRAME_LEN: u32 = 64 * 1024;

/// Number of `discord-ipc-N` endpoints the client probes.
pub const IPC_SLOTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Handshake,
    Frame,
    Close,
    Ping,
    Pong,
}

impl Opcode {
    pub fn code(self) -> u32 {
        match self {
            Opcode::Handshake => 0,
            Opcode::Frame => 1,
            Opcode::Close => 2,
            Opcode::Ping => 3,
            Opcode::Pong => 4,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Opcode::Handshake),
            1 => Some(Opcode::Frame),
            2 => Some(Opcode::Close),
            3 => Some(Opcode::Ping),
            4 => Some(Opcode::Pong),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Handshake<'a> {
    pub v: u32,
    pub client_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Command<'a> {
    pub cmd: &'a str,
    pub args: Value,
    pub nonce: String,
}

/// Reply frame from the client. Only the fields the monitor looks at.
#[derive(Debug, Default, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub cmd: Option<String>,
    #[serde(default)]
    pub evt: Option<String>,
    #[serde(default)]
    pub data: Value,
    /// Present on close frames.
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Reply {
    pub fn is_ready(&self) -> bool {
        self.cmd.as_deref() == Some("DISPATCH") && self.evt.as_deref() == Some("READY")
    }

    pub fn is_error(&self) -> bool {
        self.evt.as_deref() == Some("ERROR")
    }

    /// Best available human-readable reason carried by the reply.
    pub fn reason(&self) -> String {
        self.data
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "no reason given".to_string())
    }
}

pub fn write_frame<W: Write + ?Sized, T: Serialize>(
    writer: &mut W,
    opcode: Opcode,
    body: &T,
) -> Result<(), PresenceError> {
    let payload = serde_json::to_vec(body)?;
    let len = u32::try_from(payload.len())
        .map_err(|_| PresenceError::Protocol("frame too large".to_string()))?;

    let mut frame = Vec::with_capacity(8 + payload.len());
    frame.extend_from_slice(&opcode.code().to_le_bytes());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&payload);

    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

pub fn read_frame<R: Read + ?Sized>(reader: &mut R) -> Result<(Opcode, Value), PresenceError> {
    let mut header = [0u8; 8];
    reader.read_exact(&mut header)?;

    let code = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

    let opcode = Opcode::from_code(code)
        .ok_or_else(|| PresenceError::Protocol(format!("unknown opcode {code}")))?;
    if len > MAX_FRAME_LEN {
        return Err(PresenceError::Protocol(format!(
            "frame of {len} bytes exceeds limit"
        )));
    }

    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body)?;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)?
    };

    Ok((opcode, value))
}

/// Directories that may hold the `discord-ipc-N` sockets.
#[cfg(unix)]
fn socket_dirs() -> Vec<PathBuf> {
    let mut bases: Vec<PathBuf> = ["XDG_RUNTIME_DIR", "TMPDIR", "TMP", "TEMP"]
        .iter()
        .filter_map(std::env::var_os)
        .map(PathBuf::from)
        .collect();
    bases.push(PathBuf::from("/tmp"));

    let mut dirs = Vec::new();
    for base in bases {
        // Flatpak and Snap builds put the socket in a sandbox subdirectory.
        for dir in [
            base.clone(),
            base.join("app/com.discordapp.Discord"),
            base.join("snap.discord"),
        ] {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
    }
    dirs
}

/// Every IPC endpoint to try, in order.
#[cfg(unix)]
pub fn candidate_paths() -> Vec<PathBuf> {
    socket_dirs()
        .into_iter()
        .flat_map(|dir| (0..IPC_SLOTS).map(move |slot| dir.join(format!("discord-ipc-{slot}"))))
        .collect()
}

#[cfg(windows)]
pub fn candidate_paths() -> Vec<PathBuf> {
    (0..IPC_SLOTS)
        .map(|slot| PathBuf::from(format!(r"\\.\pipe\discord-ipc-{slot}")))
        .collect()
}
