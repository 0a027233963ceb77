//! What a front end should show for the current controller state

use shared::{JobState, JobStatus};

use super::SelectionState;

const RENDER_SUFFIX: &str = "_render.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    /// A job is running; show its progress message
    Generating { message: String },
    /// Show the selected artifact
    Artifact { filename: String, label: String },
    /// Nothing generated or selected yet
    Empty,
}

impl DisplayState {
    /// An active job takes precedence over any selection
    pub fn derive(status: &JobStatus, selection: &SelectionState) -> Self {
        if status.is_active() {
            return DisplayState::Generating {
                message: status.message.clone(),
            };
        }

        match selection.current() {
            Some(filename) => DisplayState::Artifact {
                filename: filename.to_string(),
                label: artifact_label(filename),
            },
            None => DisplayState::Empty,
        }
    }
}

/// Human label for an artifact filename
pub fn artifact_label(filename: &str) -> String {
    filename.replacen(RENDER_SUFFIX, "", 1)
}

/// The server's message when the job ended in error
pub fn error_banner(status: &JobStatus) -> Option<&str> {
    (status.status == JobState::Error).then_some(status.message.as_str())
}

/// Whether the form must refuse edits and submission
pub fn form_locked(status: &JobStatus) -> bool {
    status.is_active()
}
