use crate::{PROJECT_MARKER, ProjectName, StatusError, StatusFormat, StatusPayload, StatusProblem};
use daw_transport::{UnknownTransportState, parse_tempo};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Result of parsing status text. Parsing never fails; anything that had to be
/// defaulted is listed in `problems`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatus {
    pub payload: StatusPayload,
    pub problems: Vec<StatusProblem>,
}

impl ParsedStatus {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

pub fn parse_status(text: &str) -> ParsedStatus {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();

    if let Some(name) = lines
        .iter()
        .find_map(|line| line.split_once(PROJECT_MARKER).map(|(_, rest)| rest))
    {
        return ParsedStatus {
            payload: StatusPayload::new(ProjectName::from_raw(name)),
            problems: Vec::new(),
        };
    }

    let mut payload = StatusPayload {
        format: StatusFormat::Extended,
        ..StatusPayload::default()
    };
    let mut problems = Vec::new();
    let mut saw_key = false;

    for line in &lines {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_ascii_uppercase().as_str() {
            "PROJECT" => payload.project = ProjectName::from_raw(value),
            "TEMPO" => match parse_tempo(value) {
                Ok(tempo) => payload.tempo = tempo,
                Err(_) => {
                    payload.tempo = daw_transport::DEFAULT_TEMPO;
                    problems.push(StatusProblem::InvalidTempo(value.to_string()));
                }
            },
            "STATE" => match value.parse() {
                Ok(state) => payload.transport = state,
                Err(UnknownTransportState(raw)) => {
                    payload.transport = Default::default();
                    problems.push(StatusProblem::UnknownTransport(raw));
                }
            },
            "INSTALLATION" => {
                payload.installation = (!value.is_empty()).then(|| value.to_string());
            }
            _ => continue,
        }
        saw_key = true;
    }

    if saw_key {
        return ParsedStatus { payload, problems };
    }

    // Nothing recognisable. Blank text just means the producer hasn't written yet.
    let problems = if text.trim().is_empty() {
        Vec::new()
    } else {
        vec![StatusProblem::MissingMarker]
    };

    ParsedStatus {
        payload: StatusPayload::default(),
        problems,
    }
}

/// Read and parse the status file.
///
/// The producer writes with the platform's locale encoding, so bytes that
/// aren't UTF-8 are replaced and reported as `InvalidEncoding`.
pub fn load_status(path: &Path) -> Result<ParsedStatus, StatusError> {
    let bytes = fs::read(path).map_err(|e| StatusError::from_io(path, e))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(parse_status(&text)),
        Err(err) => {
            let text = String::from_utf8_lossy(err.as_bytes());
            let mut parsed = parse_status(&text);
            parsed.problems.insert(0, StatusProblem::InvalidEncoding);
            Ok(parsed)
        }
    }
}

/// Modification time of the status file, the change-detection signal.
pub fn status_modified(path: &Path) -> Result<SystemTime, StatusError> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| StatusError::from_io(path, e))
}
