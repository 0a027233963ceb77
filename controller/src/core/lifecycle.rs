//! Job lifecycle state machine
//!
//! Holds the locally known [`JobStatus`] and decides, for each event, what
//! the new status is and which follow-up effects the controller must carry
//! out. Whether polling should run is derived from the current state only,
//! never from the event that led there.

use shared::{component_debug, Component, JobState, JobStatus};

/// Message shown between an accepted submission and the first poll result
pub const SUBMITTED_MESSAGE: &str = "Starting...";

/// Inputs to the lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The server acknowledged a generation request
    SubmissionAccepted,
    /// A status poll returned successfully
    StatusReceived(JobStatus),
}

/// Follow-up work requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Reload the history catalog from the server
    RefreshHistory,
    /// Point the selection at the finished artifact
    Select(Option<String>),
}

#[derive(Debug, Clone, Default)]
pub struct JobLifecycle {
    status: JobStatus,
}

impl JobLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn state(&self) -> JobState {
        self.status.status
    }

    /// Whether a poll loop must be running for the current state
    pub fn polling_required(&self) -> bool {
        self.status.is_active()
    }

    /// Apply an event and return the effects it triggers
    pub fn apply(&mut self, event: LifecycleEvent) -> Vec<Effect> {
        match event {
            LifecycleEvent::SubmissionAccepted => {
                self.replace(JobStatus::preparing(SUBMITTED_MESSAGE));
                Vec::new()
            }
            LifecycleEvent::StatusReceived(status) => {
                if !self.polling_required() {
                    component_debug!(
                        Component::Poller,
                        "Ignoring status '{}' received while {}",
                        status.status,
                        self.state()
                    );
                    return Vec::new();
                }

                let completed_file = (status.status == JobState::Complete).then(|| status.current_file.clone());
                self.replace(status);

                match completed_file {
                    Some(file) => vec![Effect::RefreshHistory, Effect::Select(file)],
                    None => Vec::new(),
                }
            }
        }
    }

    fn replace(&mut self, status: JobStatus) {
        let previous = self.state();
        if previous != status.status {
            component_debug!(
                Component::Controller,
                "🔄 Job state {} -> {} ({})",
                previous,
                status.status,
                status.message
            );
        }
        self.status = status;
    }
}
