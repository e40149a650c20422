use serde::{Deserialize, Serialize};

/// Lifecycle of the meter across one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeterState {
    /// No collaborators, empty series.
    Idle,
    /// Collaborators attached, recording.
    Bound,
    /// Level ended (cleared or failed) while bound. Still records late notes.
    Finished,
    /// Series frozen and handed to the graph.
    Presenting,
}

impl Default for MeterState {
    fn default() -> Self {
        Self::Idle
    }
}

impl MeterState {
    pub fn accepts_actions(&self) -> bool {
        matches!(self, Self::Bound | Self::Finished)
    }
}

/// Requests that may move the meter to another state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterRequest {
    Bind,
    SessionEnded,
    ShowResults,
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: MeterState,
    pub to: MeterState,
}

pub struct MeterGraph;

impl MeterGraph {
    /// (Current State, Request) -> New State. `None` means ignore.
    pub fn transition(current: MeterState, request: MeterRequest) -> Option<MeterState> {
        use MeterRequest::*;
        use MeterState::*;

        match (current, request) {
            // A new session always rebinds from scratch.
            (_, Bind) => Some(Bound),

            (Bound, SessionEnded) => Some(Finished),

            (Finished, ShowResults) => Some(Presenting),

            (Presenting, Dismiss) => Some(Idle),

            _ => None,
        }
    }
}
