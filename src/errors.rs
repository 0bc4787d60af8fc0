use std::time::Duration;

use crate::flow::FlowState;

/// Process exit code for any failed run
pub const EXIT_FAILURE: i32 = 1;

/// Everything that can stop a run
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// Required configuration is missing; never retried
    #[error("{0}")]
    Config(String),
    /// An expected control is absent, even after its retry
    #[error("{what} not found")]
    NotFound { what: &'static str },
    /// No gesture tier reached the control
    #[error("{what} could not be clicked")]
    Delivery { what: &'static str },
    /// A bounded wait ran out
    #[error("{what} not found within {}s", .after.as_secs_f64())]
    Timeout { what: &'static str, after: Duration },
    /// Driver or transport failure
    #[error(transparent)]
    Browser(#[from] anyhow::Error),
}

impl RefreshError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }
}

/// A flow that ended in `Failed`
#[derive(Debug, thiserror::Error)]
#[error("{error} (last state: {last_state})")]
pub struct FlowFailure {
    /// Last state reached before the failing stage
    pub last_state: FlowState,
    #[source]
    pub error: RefreshError,
    /// Every state visited, ending in `Failed`
    pub trace: Vec<FlowState>,
}
