use thiserror::Error;

use crate::host::Collaborator;
use crate::kernel::event::HitId;

#[derive(Debug, Error)]
pub enum MeterError {
    /// One or more of the four per-session collaborators could not be located.
    #[error("could not bind collaborators, missing: {missing:?}")]
    BindingIncomplete { missing: Vec<Collaborator> },

    #[error("unsupported measurement mode {0}")]
    UnsupportedMode(i32),

    #[error("hit {0:?} finalized without a score")]
    MissingScoreOnFinalization(HitId),

    #[error("a recording controller already exists")]
    DuplicateInstance,

    #[error("performance meter is disabled in configuration")]
    Disabled,

    /// Presentation needs a tokio runtime to wait for the results view.
    #[error("no tokio runtime available to drive the presentation")]
    NoRuntime,

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
