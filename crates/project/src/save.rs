use crate::{PROJECT_MARKER, StatusError};
use std::fs;
use std::path::Path;

/// Overwrite the status file with an empty project so a previous session's
/// name isn't shown as current.
pub fn reset_status(path: &Path) -> Result<(), StatusError> {
    fs::write(path, format!("{PROJECT_MARKER} \n")).map_err(|e| StatusError::from_io(path, e))
}
