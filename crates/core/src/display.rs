//! Turning a status payload into the text the presence channel shows.

use chrono::{DateTime, Utc};
use daw_presence::Activity;
use daw_project::{ProjectName, StatusFormat, StatusPayload};

const WORKING: &str = "Working on a project";
const IDLE_STATE: &str = "Not working on a project";
const IDLE_DETAILS: &str = "Cooking up new music";

/// Artwork shown next to the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityStyle {
    pub large_image: String,
    pub large_text: Option<String>,
}

impl Default for ActivityStyle {
    fn default() -> Self {
        Self {
            large_image: "ableton_image".to_string(),
            large_text: Some("Ableton Live".to_string()),
        }
    }
}

pub fn status_line(payload: &StatusPayload) -> String {
    match (&payload.project, payload.format) {
        (ProjectName::NoProject, _) => IDLE_STATE.to_string(),
        (ProjectName::Named(_), StatusFormat::Minimal) => WORKING.to_string(),
        (ProjectName::Named(_), StatusFormat::Extended) => {
            format!("{} · {} BPM", payload.transport, payload.tempo)
        }
    }
}

pub fn build_activity(
    payload: &StatusPayload,
    anchor: DateTime<Utc>,
    style: &ActivityStyle,
) -> Activity {
    let (details, start) = match &payload.project {
        ProjectName::Named(name) => (name.clone(), Some(anchor.timestamp())),
        ProjectName::NoProject => (IDLE_DETAILS.to_string(), None),
    };

    Activity {
        state: status_line(payload),
        details,
        start,
        large_image: style.large_image.clone(),
        large_text: style.large_text.clone(),
    }
}
