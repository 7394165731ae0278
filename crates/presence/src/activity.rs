use serde_json::{Value, json};

/// Discord rejects `state`/`details` outside 2..=128 characters.
const MIN_FIELD_CHARS: usize = 2;
const MAX_FIELD_CHARS: usize = 128;

/// What the presence channel should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub state: String,
    pub details: String,
    /// Unix seconds used as the elapsed-time anchor.
    pub start: Option<i64>,
    pub large_image: String,
    pub large_text: Option<String>,
}

impl Activity {
    pub(crate) fn to_json(&self) -> Value {
        let mut activity = json!({
            "state": fit_field(&self.state),
            "details": fit_field(&self.details),
            "assets": { "large_image": self.large_image },
            "instance": false,
        });

        if let Some(start) = self.start {
            activity["timestamps"] = json!({ "start": start });
        }
        if let Some(text) = &self.large_text {
            activity["assets"]["large_text"] = json!(fit_field(text));
        }

        activity
    }
}

fn fit_field(text: &str) -> String {
    let mut fitted: String = text.chars().take(MAX_FIELD_CHARS).collect();
    let len = fitted.chars().count();
    if len < MIN_FIELD_CHARS {
        // zero-width spaces survive Discord's trimming
        fitted.extend(std::iter::repeat_n('\u{200b}', MIN_FIELD_CHARS - len));
    }
    fitted
}
