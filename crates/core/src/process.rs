//! Detecting whether the DAW is running.

use std::path::{Path, PathBuf};
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

/// The parts of a process table entry the monitor looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub name: String,
    pub exe: Option<PathBuf>,
}

impl ProcessInfo {
    pub fn new(name: impl Into<String>, exe: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            exe,
        }
    }
}

/// Which processes count as the monitored application.
///
/// Names are synonyms across platforms (`Live` on macOS,
/// `Ableton Live 12 Suite.exe` on Windows), not different states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMatcher {
    /// Exact executable names.
    pub names: Vec<String>,
    /// Executable name prefixes.
    pub prefixes: Vec<String>,
    /// When set, only executables under this directory match.
    pub installation: Option<PathBuf>,
}

impl AppMatcher {
    pub fn ableton_live() -> Self {
        Self {
            names: vec!["Live".to_string(), "Ableton Live".to_string()],
            prefixes: vec!["Ableton Live".to_string()],
            installation: None,
        }
    }

    pub fn with_installation(mut self, installation: impl Into<PathBuf>) -> Self {
        self.installation = Some(installation.into());
        self
    }

    pub fn matches(&self, process: &ProcessInfo) -> bool {
        let name = process.name.as_str();
        let name_matches = self.names.iter().any(|n| n == name)
            || self.prefixes.iter().any(|p| name.starts_with(p.as_str()));
        if !name_matches {
            return false;
        }

        match &self.installation {
            None => true,
            Some(root) => process
                .exe
                .as_deref()
                .is_some_and(|exe| exe.starts_with(root)),
        }
    }

    pub fn installation(&self) -> Option<&Path> {
        self.installation.as_deref()
    }
}

impl Default for AppMatcher {
    fn default() -> Self {
        Self::ableton_live()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("process table could not be read")]
    Unreadable,
}

/// Source of the host's running processes.
pub trait ProcessProbe: Send {
    fn processes(&mut self) -> Result<Vec<ProcessInfo>, ProbeError>;

    fn is_running(&mut self, matcher: &AppMatcher) -> Result<bool, ProbeError> {
        Ok(self.processes()?.iter().any(|p| matcher.matches(p)))
    }
}

/// Process probe backed by `sysinfo`.
pub struct SysinfoProbe {
    system: System,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProbe for SysinfoProbe {
    fn processes(&mut self) -> Result<Vec<ProcessInfo>, ProbeError> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_exe(UpdateKind::OnlyIfNotSet),
        );

        let processes: Vec<ProcessInfo> = self
            .system
            .processes()
            .values()
            .map(|p| ProcessInfo {
                name: p.name().to_string_lossy().into_owned(),
                exe: p.exe().map(Path::to_path_buf),
            })
            .collect();

        // At minimum our own process is listed; an empty table means the read failed.
        if processes.is_empty() {
            return Err(ProbeError::Unreadable);
        }
        Ok(processes)
    }
}
