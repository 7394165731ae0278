use std::fmt;
use std::str::FromStr;

/// Tempo assumed when the status file does not report one.
pub const DEFAULT_TEMPO: u32 = 120;

/// Transport state as reported by the status file producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Recording,
}

impl TransportState {
    pub fn label(&self) -> &'static str {
        match self {
            TransportState::Stopped => "Stopped",
            TransportState::Playing => "Playing",
            TransportState::Recording => "Recording",
        }
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transport state '{0}'")]
pub struct UnknownTransportState(pub String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tempo '{0}'")]
pub struct InvalidTempo(pub String);

impl FromStr for TransportState {
    type Err = UnknownTransportState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stopped" | "stop" => Ok(TransportState::Stopped),
            "playing" | "play" => Ok(TransportState::Playing),
            "recording" | "record" => Ok(TransportState::Recording),
            _ => Err(UnknownTransportState(s.trim().to_string())),
        }
    }
}

/// Parse a tempo value, rounding fractional BPM to the nearest integer.
///
/// Live reports tempo as a float (e.g. `127.5`), so both integer and decimal
/// text are accepted.
pub fn parse_tempo(s: &str) -> Result<u32, InvalidTempo> {
    let trimmed = s.trim();
    let invalid = || InvalidTempo(trimmed.to_string());

    let bpm: f64 = trimmed.parse().map_err(|_| invalid())?;
    if !bpm.is_finite() || bpm <= 0.0 || bpm > u32::MAX as f64 {
        return Err(invalid());
    }

    let rounded = bpm.round() as u32;
    if rounded == 0 {
        return Err(invalid());
    }
    Ok(rounded)
}
