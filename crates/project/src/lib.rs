//! The status file written by the DAW-side script.
//!
//! Two layouts are understood: the minimal single line
//! `Current Project Name: <name>` and the extended `KEY:VALUE` form carrying
//! `PROJECT`, `TEMPO`, `STATE` and `INSTALLATION`.

mod load;
mod save;

use daw_transport::{DEFAULT_TEMPO, TransportState};
use std::fmt;
use std::path::PathBuf;

pub use load::{ParsedStatus, load_status, parse_status, status_modified};
pub use save::reset_status;

/// Marker prefix of the minimal status line.
pub const PROJECT_MARKER: &str = "Current Project Name:";

/// Name of the open project, or the "nothing open" sentinel.
///
/// The sentinel is its own variant so a set called `"None"` stays a real name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ProjectName {
    #[default]
    NoProject,
    Named(String),
}

impl ProjectName {
    /// Normalize raw text: blank means no project.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            ProjectName::NoProject
        } else {
            ProjectName::Named(trimmed.to_string())
        }
    }

    pub fn as_named(&self) -> Option<&str> {
        match self {
            ProjectName::NoProject => None,
            ProjectName::Named(name) => Some(name),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ProjectName::Named(_))
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectName::NoProject => f.write_str("No project open"),
            ProjectName::Named(name) => f.write_str(name),
        }
    }
}

/// Which layout the status file was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFormat {
    #[default]
    Minimal,
    Extended,
}

/// Normalized contents of one status file read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusPayload {
    pub project: ProjectName,
    pub tempo: u32,
    pub transport: TransportState,
    /// Installation path reported by the producer, if any.
    pub installation: Option<String>,
    pub format: StatusFormat,
}

impl StatusPayload {
    pub fn new(project: ProjectName) -> Self {
        Self {
            project,
            ..Self::default()
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(ProjectName::Named(name.into()))
    }

    /// Whether this payload came from the given installation.
    ///
    /// Payloads that don't report an installation match any.
    pub fn is_from_installation(&self, installation: &std::path::Path) -> bool {
        match &self.installation {
            Some(reported) => std::path::Path::new(reported).starts_with(installation),
            None => true,
        }
    }
}

impl Default for StatusPayload {
    fn default() -> Self {
        Self {
            project: ProjectName::NoProject,
            tempo: DEFAULT_TEMPO,
            transport: TransportState::Stopped,
            installation: None,
            format: StatusFormat::Minimal,
        }
    }
}

/// Content problem that was resolved by falling back to a default.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusProblem {
    #[error("status text has neither a project marker nor KEY:VALUE lines")]
    MissingMarker,

    #[error("invalid tempo '{0}', using default")]
    InvalidTempo(String),

    #[error("unknown transport state '{0}', using Stopped")]
    UnknownTransport(String),

    #[error("status file is not valid UTF-8, invalid bytes replaced")]
    InvalidEncoding,
}

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("status file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error on status file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StatusError {
    pub(crate) fn from_io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StatusError::NotFound(path.to_path_buf())
        } else {
            StatusError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StatusError::NotFound(_))
    }
}
